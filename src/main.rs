//! Catalog Statistics Dashboard
//!
//! A GUI application that charts a streaming catalog CSV per year. With
//! `--headless` it prints the aggregates as JSON instead.

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalogstats::app::{App, AppWrapper};
use catalogstats::config::{AppConfig, CliConfig, FileConfig};
use catalogstats::plotting::{save_chart_png, ChartKind};
use catalogstats::types::{ContentTypeFilter, DEFAULT_TOP_K};

#[derive(Parser, Debug)]
#[clap(version, about)]
struct CliArgs {
    /// Path or http(s) URL of the catalog CSV.
    source: Option<String>,

    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Number of genres shown as their own layer in the genre mix.
    #[clap(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Content type counted by the additions chart: all, movie or tv-show.
    #[clap(long, default_value = "all")]
    content_type: ContentTypeFilter,

    /// Earliest year shown in the genre mix.
    #[clap(long)]
    min_year: Option<i32>,

    /// Print the aggregates as JSON instead of opening a window.
    #[clap(long)]
    headless: bool,

    /// Also write the charts and summary to this directory (headless only).
    #[clap(long)]
    export_dir: Option<PathBuf>,

    #[clap(long, default_value_t = 640)]
    chart_width: u32,

    #[clap(long, default_value_t = 360)]
    chart_height: u32,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            source: args.source.clone(),
            top_k: args.top_k,
            content_type: args.content_type,
            min_year: args.min_year,
            chart_width: args.chart_width,
            chart_height: args.chart_height,
            headless: args.headless,
            export_dir: args.export_dir.clone(),
        }
    }
}

fn init_logging() {
    let default_level = if cfg!(feature = "dev") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();
}

fn load_file_config(args: &CliArgs) -> Result<Option<FileConfig>> {
    if let Some(path) = &args.config {
        info!("Loading configuration from {:?}", path);
        return FileConfig::load(path).map(Some);
    }
    match FileConfig::default_path() {
        Some(path) if path.exists() => {
            info!("Loading configuration from {:?}", path);
            FileConfig::load(&path).map(Some)
        }
        _ => Ok(None),
    }
}

fn build_app(config: &AppConfig) -> App {
    let mut app = App::new(
        config.source.clone().unwrap_or_default(),
        config.top_k,
        config.chart_size,
    );
    app.set_content_filter(config.content_type);
    app
}

async fn run_headless(config: AppConfig) -> Result<()> {
    let mut app = build_app(&config);
    let parsed = app
        .load()
        .await
        .with_context(|| format!("Failed to load catalog from {}", app.source))?;
    app.update_with_rows(parsed);
    if config.min_year.is_some() {
        app.set_min_year(config.min_year);
    }

    let summary = serde_json::to_string_pretty(&app.summary())?;
    println!("{}", summary);

    if let Some(dir) = &config.export_dir {
        export(&app, &summary, dir)?;
    }
    Ok(())
}

fn export(app: &App, summary: &str, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    for kind in ChartKind::ALL {
        let path = dir.join(kind.file_name());
        save_chart_png(kind, app, app.chart_size, &path)
            .with_context(|| format!("Failed to export {}", path.display()))?;
        info!("Wrote {}", path.display());
    }
    let summary_path = dir.join("summary.json");
    std::fs::write(&summary_path, summary)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    info!("Wrote {}", summary_path.display());
    Ok(())
}

fn run_gui(config: AppConfig) -> Result<()> {
    let mut app = build_app(&config);
    let initial_load = config.source.is_some().then(|| app.load());
    let app = Arc::new(Mutex::new(app));

    if let Some(future) = initial_load {
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            let result = future.await;
            if let Ok(mut app) = app.lock() {
                app.finish_loading(result);
                if config.min_year.is_some() {
                    app.set_min_year(config.min_year);
                }
            }
        });
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Catalog Statistics"),
        ..Default::default()
    };

    eframe::run_native(
        "Catalog Statistics",
        options,
        Box::new(move |cc| {
            // Configure default fonts and style
            let fonts = egui::FontDefinitions::default();
            cc.egui_ctx.set_fonts(fonts);

            Ok(Box::new(AppWrapper { app }) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| anyhow::anyhow!("Error running application: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    init_logging();

    let file_config = load_file_config(&cli_args)?;
    let cli_config: CliConfig = (&cli_args).into();
    let config = AppConfig::resolve(&cli_config, file_config)?;

    if config.headless {
        run_headless(config).await
    } else {
        run_gui(config)
    }
}
