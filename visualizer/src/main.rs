use forecastcore::dataset::DatasetInfo;
use forecastcore::prelude::MetricKey;
use forecastcore::views::{ComparativeView, ProfileCard, SortIndicator, TableView, TrendView};
use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, Column, Container, Row,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use serde::Deserialize;
use serde_json::json;
use std::{f32::consts::PI, time::Duration};

const BRIDGE_URL: &str = "http://127.0.0.1:9000";

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Forecast Model Comparison".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    views: Option<ViewsPayload>,
    profiles: Vec<ProfileCard>,
    info: Option<DatasetInfo>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    ViewsFetched(Result<ViewsPayload, String>),
    ProfilesFetched(Result<Vec<ProfileCard>, String>),
    InfoFetched(Result<DatasetInfo, String>),
    ToggleModel(String),
    SortBy(MetricKey),
    ToggleAll,
    Reset,
    EventPosted(Result<String, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                views: None,
                profiles: Vec::new(),
                info: None,
                status: "Waiting for the workbench bridge...".into(),
                history: Vec::new(),
            },
            Task::batch([
                Task::perform(fetch_views(), Message::ViewsFetched),
                Task::perform(fetch_json("profiles"), Message::ProfilesFetched),
                Task::perform(fetch_json("info"), Message::InfoFetched),
            ]),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                let mut tasks = vec![Task::perform(fetch_views(), Message::ViewsFetched)];
                // Profiles and info never change for a session; retry until loaded.
                if state.profiles.is_empty() {
                    tasks.push(Task::perform(fetch_json("profiles"), Message::ProfilesFetched));
                }
                if state.info.is_none() {
                    tasks.push(Task::perform(fetch_json("info"), Message::InfoFetched));
                }
                Task::batch(tasks)
            }
            Message::ProfilesFetched(Ok(profiles)) => {
                state.push_history(format!("Loaded {} model profiles", profiles.len()));
                state.profiles = profiles;
                Task::none()
            }
            Message::InfoFetched(Ok(info)) => {
                state.info = Some(info);
                Task::none()
            }
            Message::ProfilesFetched(Err(err)) | Message::InfoFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::ViewsFetched(Ok(views)) => {
                let changed = state
                    .views
                    .as_ref()
                    .map_or(true, |current| current.revision != views.revision);
                if changed {
                    let active = views.table.rows.iter().filter(|row| row.is_active).count();
                    state.status = format!(
                        "Revision {}: {} of {} models selected",
                        views.revision,
                        active,
                        views.table.rows.len()
                    );
                    state.push_history(format!("Views synced (revision {})", views.revision));
                }
                state.views = Some(views);
                Task::none()
            }
            Message::ViewsFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::ToggleModel(model_id) => {
                state.push_history(format!("Toggle {model_id}"));
                Task::perform(
                    post_event("toggle", Some(json!({ "model_id": model_id }))),
                    Message::EventPosted,
                )
            }
            Message::SortBy(key) => {
                state.push_history(format!("Sort by {key}"));
                Task::perform(
                    post_event("sort", Some(json!({ "key": key.code() }))),
                    Message::EventPosted,
                )
            }
            Message::ToggleAll => Task::perform(post_event("toggle-all", None), Message::EventPosted),
            Message::Reset => Task::perform(post_event("reset", None), Message::EventPosted),
            Message::EventPosted(Ok(_)) => Task::perform(fetch_views(), Message::ViewsFetched),
            Message::EventPosted(Err(err)) => {
                state.status = format!("Event rejected: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let Some(views) = &state.views else {
            return Container::new(text(&state.status).size(18))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };

        let chips = selector_entries(&state.profiles, &views.table)
            .into_iter()
            .fold(Row::new().spacing(6), |chips, entry| {
                let marker = if entry.active { "●" } else { "○" };
                chips.push(
                    button(text(format!("{marker} {}", entry.name)).size(13).color(hex_color(&entry.color)))
                        .on_press(Message::ToggleModel(entry.model_id))
                        .padding(6),
                )
            });
        let controls = row![
            chips,
            button("Toggle all").on_press(Message::ToggleAll).padding(6),
            button("Reset").on_press(Message::Reset).padding(6),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let first = views.trend.labels.first();
        let last = views.trend.labels.last();
        let range = match (first, last) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "no points".into(),
        };
        let trend_chart = Canvas::new(TrendChart {
            trend: views.trend.clone(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(280.0));

        let comparative: Element<'_, Message> = if views.comparative.is_empty() {
            Container::new(text("Select at least one model to compare.").size(14))
                .height(Length::Fixed(240.0))
                .center_y(Length::Fixed(240.0))
                .into()
        } else {
            Canvas::new(RadarChart {
                comparative: views.comparative.clone(),
            })
            .width(Length::Fill)
            .height(Length::Fixed(240.0))
            .into()
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let chart_column = column![
            text("Price trend").size(22),
            text(range).size(12),
            trend_chart,
            text("Normalized metrics (outer ring is best)").size(18),
            comparative,
        ]
        .spacing(10)
        .width(Length::FillPortion(3));

        let table_column = column![
            text("Metrics").size(22),
            metrics_table(&views.table),
            text(&state.status).size(14),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(120.0))).padding(6),
        ]
        .spacing(10)
        .width(Length::FillPortion(2));

        let layout = column![
            controls,
            row![chart_column, table_column].spacing(20),
            text("Dataset & model playbook").size(22),
            row![dataset_panel(state.info.as_ref()), profile_panel(&state.profiles)].spacing(20),
        ]
        .spacing(16)
        .padding(20);

        Container::new(scrollable(layout))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SelectorEntry {
    model_id: String,
    name: String,
    color: String,
    active: bool,
}

/// Chips follow dataset input order, never the table's sort order.
fn selector_entries(profiles: &[ProfileCard], table: &TableView) -> Vec<SelectorEntry> {
    profiles
        .iter()
        .map(|card| SelectorEntry {
            model_id: card.model_id.clone(),
            name: card.name.clone(),
            color: card.color.clone(),
            active: table
                .rows
                .iter()
                .any(|row| row.model_id == card.model_id && row.is_active),
        })
        .collect()
}

fn bullet_list<'a>(title: &'a str, items: &'a [String]) -> Column<'a, Message> {
    let list = Column::new().spacing(2).push(text(title).size(15));
    if items.is_empty() {
        return list.push(text("none listed").size(12));
    }
    items
        .iter()
        .fold(list, |list, item| list.push(text(format!("• {item}")).size(12)))
}

fn dataset_panel(info: Option<&DatasetInfo>) -> Element<'_, Message> {
    let Some(info) = info else {
        return text("Dataset facts not loaded yet.").size(13).into();
    };
    let fact = |label: &str, value: &Option<String>| {
        text(format!("{label}: {}", value.as_deref().unwrap_or("n/a"))).size(13)
    };
    column![
        text(info.name.clone().unwrap_or_else(|| "Dataset".into())).size(18),
        fact("Period", &info.period),
        fact("Horizon", &info.horizon),
        fact("Frequency", &info.frequency),
        bullet_list("Feature stack", &info.feature_stack),
        bullet_list("Workflow", &info.workflow),
        bullet_list("Insight summary", &info.insight_summary),
        bullet_list("Analyst insights", &info.analyst_insights),
    ]
    .spacing(6)
    .width(Length::FillPortion(2))
    .into()
}

fn profile_panel(profiles: &[ProfileCard]) -> Element<'_, Message> {
    profiles
        .iter()
        .fold(Column::new().spacing(14).width(Length::FillPortion(3)), |panel, card| {
            let metrics = card.metrics.iter().fold(Row::new().spacing(10), |metrics, cell| {
                let best = if cell.is_best { " ★" } else { "" };
                metrics.push(text(format!("{} {}{best}", cell.metric_key, cell.display_value)).size(12))
            });
            let optional = |label: &str, value: &Option<String>| {
                value
                    .as_ref()
                    .map(|value| text(format!("{label}: {value}")).size(12))
            };
            let mut body = Column::new()
                .spacing(3)
                .push(text(card.name.clone()).size(16).color(hex_color(&card.color)))
                .push(text(card.technique.clone()).size(12));
            for line in [
                optional("Summary", &card.summary),
                optional("Best for", &card.best_for),
                optional("Watch out", &card.watch_out),
            ]
            .into_iter()
            .flatten()
            {
                body = body.push(line);
            }
            if !card.features.is_empty() {
                body = body.push(text(format!("Features: {}", card.features.join(", "))).size(12));
            }
            panel.push(body.push(metrics))
        })
        .into()
}

fn metrics_table(table: &TableView) -> Element<'_, Message> {
    let header = table.columns.iter().fold(
        Row::new().spacing(4).push(text("Model").size(14).width(Length::Fixed(150.0))),
        |header, column| {
            let arrow = match column.sort {
                SortIndicator::None => "",
                SortIndicator::Ascending => " ▲",
                SortIndicator::Descending => " ▼",
            };
            header.push(
                button(text(format!("{}{arrow}", column.label)).size(13))
                    .on_press(Message::SortBy(column.key))
                    .width(Length::Fixed(110.0)),
            )
        },
    );

    table
        .rows
        .iter()
        .fold(Column::new().spacing(6).push(header), |rows, table_row| {
            let name_color = if table_row.is_active {
                hex_color(&table_row.color)
            } else {
                Color::from_rgb(0.45, 0.45, 0.5)
            };
            let cells = table_row.cells.iter().fold(
                Row::new().spacing(4).push(
                    text(table_row.name.clone())
                        .size(14)
                        .color(name_color)
                        .width(Length::Fixed(150.0)),
                ),
                |cells, cell| {
                    let label = if cell.is_best {
                        format!("{} ★", cell.display_value)
                    } else {
                        cell.display_value.clone()
                    };
                    cells.push(text(label).size(14).width(Length::Fixed(110.0)))
                },
            );
            rows.push(cells)
        })
        .into()
}

async fn fetch_views() -> Result<ViewsPayload, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/views"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<ViewsPayload>()
        .await
        .map_err(|e| e.to_string())
}

async fn fetch_json<T: serde::de::DeserializeOwned>(route: &'static str) -> Result<T, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/{route}"))
        .await
        .map_err(|e| e.to_string())?;
    response.json::<T>().await.map_err(|e| e.to_string())
}

async fn post_event(route: &'static str, body: Option<serde_json::Value>) -> Result<String, String> {
    let client = reqwest::Client::new();
    let mut request = client.post(format!("{BRIDGE_URL}/{route}"));
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await.map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(route.into())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_else(|_| "".into());
        Err(format!("{}: {}", status, text))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ViewsPayload {
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    trend: TrendView,
    #[serde(default)]
    comparative: ComparativeView,
    #[serde(default)]
    table: TableView,
}

/// `#rrggbb` to a color; anything else falls back to slate.
fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    match (digits.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => Color::from_rgb8(r, g, b),
        _ => Color::from_rgb(0.58, 0.64, 0.72),
    }
}

#[derive(Clone)]
struct TrendChart {
    trend: TrendView,
}

impl canvas::Program<Message> for TrendChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.07),
        );

        let values = self
            .trend
            .datasets
            .iter()
            .flat_map(|dataset| dataset.points.iter().flatten().copied());
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let count = self.trend.labels.len();
        if count < 2 || !min.is_finite() {
            return vec![frame.into_geometry()];
        }
        let range = (max - min).max(1e-9);
        let step = bounds.width / (count as f32 - 1.0);

        for dataset in &self.trend.datasets {
            let path = Path::new(|builder| {
                let mut pen_down = false;
                for (i, point) in dataset.points.iter().enumerate() {
                    // Gaps lift the pen instead of dropping to zero.
                    let Some(value) = point else {
                        pen_down = false;
                        continue;
                    };
                    let x = i as f32 * step;
                    let normalized = ((value - min) / range) as f32;
                    let y = bounds.height - normalized * (bounds.height - 8.0) - 4.0;
                    if pen_down {
                        builder.line_to(Point::new(x, y));
                    } else {
                        builder.move_to(Point::new(x, y));
                        pen_down = true;
                    }
                }
            });
            let width = if dataset.model_id.is_none() { 3.0 } else { 2.0 };
            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(width)
                    .with_color(hex_color(&dataset.color)),
            );
        }

        vec![frame.into_geometry()]
    }
}

#[derive(Clone)]
struct RadarChart {
    comparative: ComparativeView,
}

impl canvas::Program<Message> for RadarChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.02, 0.02, 0.04),
        );

        let ComparativeView::Populated { axes, datasets } = &self.comparative else {
            return vec![frame.into_geometry()];
        };
        if axes.is_empty() {
            return vec![frame.into_geometry()];
        }

        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let radius = bounds.width.min(bounds.height) / 2.0 - 12.0;
        let vertex = |axis: usize, score: f64| {
            let angle = -PI / 2.0 + axis as f32 * 2.0 * PI / axes.len() as f32;
            let r = radius * score.clamp(0.0, 1.0) as f32;
            Point::new(center.x + r * angle.cos(), center.y + r * angle.sin())
        };

        for ring in 1..=4 {
            let ring_path = Path::new(|builder| builder.circle(center, radius * ring as f32 / 4.0));
            frame.stroke(
                &ring_path,
                Stroke::default().with_color(Color::from_rgb(0.25, 0.25, 0.3)),
            );
        }
        let spokes = Path::new(|builder| {
            for axis in 0..axes.len() {
                builder.move_to(center);
                builder.line_to(vertex(axis, 1.0));
            }
        });
        frame.stroke(
            &spokes,
            Stroke::default()
                .with_color(Color::from_rgb(0.35, 0.35, 0.45))
                .with_width(1.0),
        );

        for dataset in datasets {
            let polygon = Path::new(|builder| {
                for (axis, score) in dataset.normalized_vector.iter().enumerate() {
                    if axis == 0 {
                        builder.move_to(vertex(axis, *score));
                    } else {
                        builder.line_to(vertex(axis, *score));
                    }
                }
                builder.close();
            });
            frame.stroke(
                &polygon,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(hex_color(&dataset.color)),
            );
        }

        vec![frame.into_geometry()]
    }
}
