use std::{env, path::PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use lapse_catalog::CatalogClient;
use lapse_ops::{init_tracing, Journal};
use lapse_timeline::{InitialPage, NavigationController, ViewModel};
use lapse_types::{
    capture::{AvailableDates, DateKey},
    config::{CatalogSourceKind, ViewerConfig},
};
use tracing::info;

mod ui;

/// Browse timelapse captures day by day.
#[derive(Debug, Parser)]
#[command(name = "lapse", version)]
struct Args {
    /// TOML config file (falls back to LAPSE_CONFIG, then configs/viewer.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Catalog server base URL, e.g. http://raspberrypi.local:5000.
    #[arg(long, conflicts_with = "dir")]
    catalog_url: Option<String>,
    /// Read captures straight from a capture directory instead of a server.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Pre-rendered initial page (JSON) to start from.
    #[arg(long)]
    page: Option<PathBuf>,
    #[arg(long)]
    log_level: Option<String>,
}

/// Initial page plus the dates already fetched while building it.
struct Bootstrap {
    page: InitialPage,
    dates: Option<AvailableDates>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args);
    init_tracing(&config.ops)?;

    let catalog = CatalogClient::from_config(&config.catalog)?;
    let journal = Journal::new(config.ops.journal_capacity);
    let bootstrap = bootstrap(&args, &catalog).await?;
    let summary = format!("{} / {:?}", catalog.describe(), config.navigation.stale_responses);

    let controller = NavigationController::new(
        bootstrap.page.into_state(),
        catalog,
        ViewModel::new(),
        journal,
        &config.navigation,
    );
    info!("Timeline mounted on {}", controller.state().current_date());

    let handle = tokio::runtime::Handle::current();
    tokio::task::block_in_place(|| ui::run(controller, bootstrap.dates, handle, summary))
}

fn load_config(args: &Args) -> ViewerConfig {
    let path = args
        .config
        .clone()
        .or_else(|| env::var("LAPSE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("configs/viewer.toml"));

    let mut config = match ViewerConfig::from_file(&path) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!(
                "Failed to load config from '{}': {err}. Falling back to internal defaults.",
                path.display()
            );
            ViewerConfig::default()
        }
    };

    if let Some(url) = &args.catalog_url {
        config.catalog.source = CatalogSourceKind::Http;
        config.catalog.base_url = url.clone();
    }
    if let Some(dir) = &args.dir {
        config.catalog.source = CatalogSourceKind::Directory;
        config.catalog.root_dir = Some(dir.display().to_string());
    }
    if let Some(level) = &args.log_level {
        config.ops.log_level = level.clone();
    }

    if let Err(err) = config.validate() {
        eprintln!("Invalid config: {err}. Falling back to internal defaults.");
        let defaults = ViewerConfig::default();
        debug_assert!(defaults.validate().is_ok());
        return defaults;
    }
    config
}

/// Uses the supplied page, or renders one for the catalog's latest day the
/// way the server would.
async fn bootstrap(args: &Args, catalog: &CatalogClient) -> Result<Bootstrap> {
    if let Some(path) = &args.page {
        return Ok(Bootstrap {
            page: InitialPage::from_file(path)?,
            dates: None,
        });
    }

    let dates = catalog.fetch_available_dates().await;
    let page = match dates.latest() {
        Some(latest) => {
            let images = catalog.fetch_day_images(latest).await;
            InitialPage::for_day(latest.clone(), &images)
        }
        None => InitialPage::for_day(DateKey::from_date(Local::now().date_naive()), &[]),
    };
    Ok(Bootstrap {
        page,
        dates: Some(dates),
    })
}
