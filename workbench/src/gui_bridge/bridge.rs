use crate::gui_bridge::model::{
    BridgeEvent, SelectRequest, SortRequest, ToggleRequest, VisualizationModel,
};
use forecastcore::dataset::DatasetInfo;
use forecastcore::prelude::{CoreResult, ViewSink};
use forecastcore::views::{ComparativeView, Dashboard, ProfileCard, TableView, TrendView};
use log::{error, info, warn};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock, RwLockWriteGuard},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

pub fn gui_bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Mirrors every synchronization into the model served on `GET /views`.
struct BridgeSink {
    state: Arc<RwLock<VisualizationModel>>,
}

impl BridgeSink {
    fn model(&self) -> RwLockWriteGuard<'_, VisualizationModel> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ViewSink for BridgeSink {
    fn publish_trend(&mut self, view: &TrendView) {
        self.model().trend = view.clone();
    }

    fn publish_comparative(&mut self, view: &ComparativeView) {
        self.model().comparative = view.clone();
    }

    fn publish_table(&mut self, view: &TableView) {
        let mut guard = self.model();
        guard.table = view.clone();
        guard.revision += 1;
    }
}

/// Hosts the dashboard behind an HTTP endpoint for the visualizer.
#[derive(Clone)]
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
    dashboard: Arc<RwLock<Dashboard>>,
}

impl GuiBridge {
    pub fn new(mut dashboard: Dashboard) -> Self {
        let state = Arc::new(RwLock::new(VisualizationModel::default()));
        dashboard.attach(Box::new(BridgeSink {
            state: state.clone(),
        }));
        Self {
            state,
            dashboard: Arc::new(RwLock::new(dashboard)),
        }
    }

    /// Applies one user event; returns the view revision it produced.
    pub fn apply(&self, event: BridgeEvent) -> CoreResult<u64> {
        {
            let mut dashboard = self
                .dashboard
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            match event {
                BridgeEvent::Toggle { model_id } => {
                    dashboard.toggle(&model_id)?;
                }
                BridgeEvent::Select { model_id, active } => {
                    dashboard.set_active(&model_id, active)?;
                }
                BridgeEvent::Sort { key } => {
                    dashboard.click_sort_code(&key)?;
                }
                BridgeEvent::ToggleAll => {
                    dashboard.toggle_all();
                }
                BridgeEvent::SelectAll => {
                    dashboard.select_all();
                }
                BridgeEvent::SelectNone => {
                    dashboard.select_none();
                }
                BridgeEvent::Reset => {
                    dashboard.reset();
                }
            }
        }
        Ok(self.snapshot().revision)
    }

    pub fn snapshot(&self) -> VisualizationModel {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn profile_cards(&self) -> Vec<ProfileCard> {
        self.dashboard
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .profile_cards()
    }

    pub fn dataset_info(&self) -> DatasetInfo {
        self.dashboard
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dataset()
            .info()
            .clone()
    }

    fn reply(&self, event: BridgeEvent) -> warp::reply::WithStatus<warp::reply::Json> {
        match self.apply(event) {
            Ok(revision) => warp::reply::with_status(
                warp::reply::json(&json!({ "status": "ok", "revision": revision })),
                StatusCode::OK,
            ),
            Err(err) => {
                warn!("[GUI] event rejected: {}", err);
                warp::reply::with_status(
                    warp::reply::json(&json!({ "status": "error", "message": err.to_string() })),
                    StatusCode::BAD_REQUEST,
                )
            }
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let bridge = self.clone();
        let bridge_filter = warp::any().map(move || bridge.clone());

        let views_route = warp::path("views")
            .and(warp::path::end())
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| warp::reply::json(&bridge.snapshot()));

        let profiles_route = warp::path("profiles")
            .and(warp::path::end())
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| warp::reply::json(&bridge.profile_cards()));

        let info_route = warp::path("info")
            .and(warp::path::end())
            .and(warp::get())
            .and(bridge_filter.clone())
            .map(|bridge: GuiBridge| warp::reply::json(&bridge.dataset_info()));

        let toggle = warp::path("toggle")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .map(|request: ToggleRequest| BridgeEvent::Toggle {
                model_id: request.model_id,
            });
        let select = warp::path("select")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .map(|request: SelectRequest| BridgeEvent::Select {
                model_id: request.model_id,
                active: request.active,
            });
        let sort = warp::path("sort")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .map(|request: SortRequest| BridgeEvent::Sort { key: request.key });
        let toggle_all = warp::path("toggle-all")
            .and(warp::path::end())
            .and(warp::post())
            .map(|| BridgeEvent::ToggleAll);
        let select_all = warp::path("select-all")
            .and(warp::path::end())
            .and(warp::post())
            .map(|| BridgeEvent::SelectAll);
        let select_none = warp::path("select-none")
            .and(warp::path::end())
            .and(warp::post())
            .map(|| BridgeEvent::SelectNone);
        let reset = warp::path("reset")
            .and(warp::path::end())
            .and(warp::post())
            .map(|| BridgeEvent::Reset);

        let event_route = toggle
            .or(select)
            .unify()
            .or(sort)
            .unify()
            .or(toggle_all)
            .unify()
            .or(select_all)
            .unify()
            .or(select_none)
            .unify()
            .or(reset)
            .unify()
            .and(bridge_filter)
            .map(|event: BridgeEvent, bridge: GuiBridge| bridge.reply(event));

        views_route.or(profiles_route).or(info_route).or(event_route)
    }

    /// Serves the routes on a background thread with its own runtime.
    pub fn serve(&self, address: SocketAddr) {
        let routes = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("[GUI] failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        });
        info!("[GUI] bridge listening on http://{}", address);
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }
}
