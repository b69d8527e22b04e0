use anyhow::{Context, bail};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui_vision::core_modules::utils::image_helper::image_helper;
use ui_vision::pipeline::load_pixels;
use ui_vision::{AnalysisConfig, BatchAnalyzer, UiAnalyzer, WorkerPool};

/// Runs the ui_vision engine over screenshots and prints the analysis as JSON.
#[derive(Parser, Debug)]
#[command(name = "visual_tester", version)]
struct Args {
    /// Screenshots to analyse (PNG, JPEG, ...).
    #[arg(required_unless_present = "print_config")]
    images: Vec<PathBuf>,

    /// JSON file with tuned analysis parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,

    /// Write a PNG with every component outlined (single image only).
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Write one PNG crop per component into this directory (single image only).
    #[arg(long)]
    crops: Option<PathBuf>,

    /// Worker count for batches; defaults to one per CPU.
    #[arg(long)]
    workers: Option<usize>,

    /// Print compact JSON instead of pretty JSON.
    #[arg(long)]
    compact: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn render(value: &serde_json::Value, compact: bool) -> anyhow::Result<String> {
    Ok(if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    // --- 1. Configuration ---
    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    let analyzer = UiAnalyzer::with_config(config)?;
    if args.print_config {
        println!("{}", analyzer.config().to_json_pretty()?);
        return Ok(());
    }

    // --- 2. Single image: analyse in place, optionally export visuals ---
    if let [path] = args.images.as_slice() {
        let pixels = load_pixels(path).await?;
        let result = analyzer.analyze(&pixels);

        if let Some(overlay) = &args.overlay {
            let canvas = image_helper::render_overlay(&pixels, &result);
            image_helper::save_rgba(overlay, &canvas)
                .with_context(|| format!("writing overlay {}", overlay.display()))?;
            info!(path = %overlay.display(), "overlay written");
        }
        if let Some(dir) = &args.crops {
            let written = image_helper::save_component_crops(dir, &pixels, &result)
                .with_context(|| format!("writing crops into {}", dir.display()))?;
            info!(count = written.len(), dir = %dir.display(), "component crops written");
        }

        println!("{}", render(&serde_json::to_value(&result)?, args.compact)?);
        return Ok(());
    }

    if args.overlay.is_some() || args.crops.is_some() {
        bail!("--overlay and --crops need exactly one input image");
    }

    // --- 3. Batch: analyse on the worker pool, keep input order ---
    let batch = match args.workers {
        Some(workers) => BatchAnalyzer::new(analyzer, workers),
        None => BatchAnalyzer::with_pool(WorkerPool::new(analyzer)),
    };
    let items = batch.analyze_all(args.images.clone()).await;
    batch.shutdown().await;

    let mut failures = 0;
    let mut report = Vec::with_capacity(items.len());
    for item in items {
        let path = item.path.display().to_string();
        match item.result {
            Ok(result) => report.push(json!({ "path": path, "result": result })),
            Err(e) => {
                failures += 1;
                report.push(json!({ "path": path, "error": e.to_string() }));
            }
        }
    }
    println!("{}", render(&serde_json::Value::Array(report), args.compact)?);

    if failures > 0 {
        warn!(failures, "some images could not be analysed");
        bail!("{failures} image(s) failed to load");
    }
    Ok(())
}
