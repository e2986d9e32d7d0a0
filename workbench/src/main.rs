use anyhow::Context;
use clap::Parser;
use forecastcore::dataset::DatasetDocument;
use forecastcore::prelude::MetricFamily;
use generator::profile::build_document;
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{load_dataset, WorkbenchConfig};
use workflow::runner::{render_table, Runner};

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Forecast model comparison workbench")]
struct Args {
    /// Dataset document to compare (JSON, or YAML by extension)
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Load a workbench config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ignore any configured dataset and generate a synthetic one
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Metric family: regression or directional
    #[arg(long)]
    family: Option<MetricFamily>,
    #[arg(long)]
    default_selection: Option<usize>,
    #[arg(long)]
    port: Option<u16>,
    /// Print the comparison table once and append a summary to the report log
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Write the initial view snapshot as JSON
    #[arg(long)]
    export: Option<PathBuf>,
    /// Keep the GUI bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WorkbenchConfig::load(path)?,
        None => WorkbenchConfig::default(),
    };
    if let Some(family) = args.family {
        config.family = family;
    }
    if let Some(count) = args.default_selection {
        config.default_selection = count;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let document = resolve_document(&args, &config)?;
    let runner = Runner::new(config.clone());

    if args.offline || args.export.is_some() {
        let result = runner.execute(document.clone())?;

        if args.offline {
            println!(
                "Offline comparison -> models {}, points {}, family {:?}",
                result.model_count, result.point_count, config.family
            );
            print!("{}", render_table(&result.snapshot.table));
            for discrepancy in &result.consistency.discrepancies {
                warn!(
                    "{} {} shown {:.4} but recomputes to {:.4}",
                    discrepancy.model_id, discrepancy.key, discrepancy.shown, discrepancy.reference
                );
            }

            let best: Vec<String> = result
                .snapshot
                .table
                .rows
                .iter()
                .flat_map(|row| {
                    row.cells
                        .iter()
                        .filter(|cell| cell.is_best)
                        .map(move |cell| format!("{}={}", cell.metric_key, row.model_id))
                })
                .collect();
            let report = format!(
                "models={} points={} family={:?} best=[{}] discrepancies={}\n",
                result.model_count,
                result.point_count,
                config.family,
                best.join(","),
                result.consistency.discrepancies.len()
            );
            let report_path = PathBuf::from("reports/offline_comparison.log");
            if let Some(parent) = report_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&report_path)?;
            file.write_all(report.as_bytes())?;
        }

        if let Some(path) = &args.export {
            let json = serde_json::to_string_pretty(&result.snapshot)?;
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("view snapshot written to {}", path.display());
        }
    }

    if args.serve {
        let gui_bridge = GuiBridge::new(runner.prepare(document)?);
        gui_bridge.serve(gui_bind_address(config.port));
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}

fn resolve_document(args: &Args, config: &WorkbenchConfig) -> anyhow::Result<DatasetDocument> {
    if !args.synthetic {
        if let Some(path) = args.dataset.as_ref().or(config.dataset.as_ref()) {
            info!("loading dataset {}", path.display());
            return load_dataset(path);
        }
    }
    info!("generating synthetic dataset (seed {})", config.generator.seed);
    build_document(&config.generator)
}
