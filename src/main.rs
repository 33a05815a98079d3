use commodity_tracker::config::load_config;
use commodity_tracker::pipeline::{spawn_scheduler, Pipeline, Sources};
use commodity_tracker::scraper::build_client;
use commodity_tracker::storage::{PriceRepository, SqliteStorage};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration from file
    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let client = match build_client(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    // Initialize storage (SQLite) with async access (wrapped in a Mutex)
    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return;
        }
    };

    {
        let db = storage.lock().await;
        match db.summary() {
            Ok(summary) => {
                for series in summary {
                    info!(
                        "{}: {} records ({} .. {})",
                        series.commodity, series.count, series.earliest, series.latest
                    );
                }
            }
            Err(e) => warn!("Summary query failed: {}", e),
        }
        if let Ok(latest) = db.latest_prices() {
            for price in latest {
                info!("Latest {}: {} on {}", price.commodity, price.value, price.date);
            }
        }
    }

    let pipeline = Arc::new(Pipeline::new(
        Sources::from_config(client, &config),
        storage.clone(),
    ));

    // Cold start: serve the persisted table until the first fetch lands
    if let Err(e) = pipeline.warm_start().await {
        warn!("Could not load persisted table: {}", e);
    }

    // Manual refresh: SIGHUP triggers an extra cycle
    let refresh_notify = Arc::new(Notify::new());
    #[cfg(unix)]
    {
        let refresh = refresh_notify.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let mut hangup = match signal(SignalKind::hangup()) {
                Ok(s) => s,
                Err(e) => {
                    warn!("SIGHUP handler unavailable: {}", e);
                    return;
                }
            };
            while hangup.recv().await.is_some() {
                info!("SIGHUP received, triggering refresh...");
                refresh.notify_one();
            }
        });
    }

    let scheduler = spawn_scheduler(
        pipeline.clone(),
        Duration::from_secs(config.check_interval_seconds),
        refresh_notify,
        config.display.clone(),
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down...");
    scheduler.abort();
}
