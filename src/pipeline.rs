// Fetch-merge-detect cycle and its periodic scheduler
use crate::analyzer::{build_view, detect, ChartView, DisplayConfig};
use crate::config::AppConfig;
use crate::merger::merge;
use crate::model::{
    AlignedTable, ChangeRecord, Commodity, FetchResult, PipelineError, StorageError, SERIES_START,
};
use crate::scraper::{LmeSource, OilPriceSource, PriceSource};
use crate::storage::{FetchStatus, PriceRepository};
use crate::utils::today;
use chrono::NaiveDate;
use futures::future::try_join3;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

/// The three upstream feeds, one per commodity.
pub struct Sources {
    pub copper: Arc<dyn PriceSource>,
    pub zinc: Arc<dyn PriceSource>,
    pub oil: Arc<dyn PriceSource>,
}

impl Sources {
    pub fn from_config(client: Client, config: &AppConfig) -> Self {
        Self {
            copper: Arc::new(LmeSource::new(
                client.clone(),
                Commodity::Copper,
                &config.sources.copper,
            )),
            zinc: Arc::new(LmeSource::new(
                client.clone(),
                Commodity::Zinc,
                &config.sources.zinc,
            )),
            oil: Arc::new(OilPriceSource::new(client, &config.sources.oil)),
        }
    }
}

/// Result of one successful cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub rows: usize,
    pub saved: usize,
    pub change: ChangeRecord,
}

/// Owns the current aligned table and runs fetch-merge-detect cycles against
/// an injected repository. Only one cycle runs at a time: the diff must be
/// taken against the table the previous cycle produced.
pub struct Pipeline<R: PriceRepository> {
    sources: Sources,
    storage: Arc<Mutex<R>>,
    current: RwLock<Arc<AlignedTable>>,
    cycle: Mutex<()>,
}

impl<R: PriceRepository> Pipeline<R> {
    pub fn new(sources: Sources, storage: Arc<Mutex<R>>) -> Self {
        Self {
            sources,
            storage,
            current: RwLock::new(Arc::new(Vec::new())),
            cycle: Mutex::new(()),
        }
    }

    /// Loads the persisted table into memory. Used on cold start.
    pub async fn warm_start(&self) -> Result<usize, StorageError> {
        let table = self.storage.lock().await.load_table(SERIES_START)?;
        let rows = table.len();
        *self.current.write().await = Arc::new(table);
        info!("Loaded {} persisted rows", rows);
        Ok(rows)
    }

    pub async fn current(&self) -> Arc<AlignedTable> {
        self.current.read().await.clone()
    }

    pub async fn view(&self, config: &DisplayConfig, today: NaiveDate) -> ChartView {
        let table = self.current().await;
        build_view(&table, config, today)
    }

    /// Fetches all three sources concurrently and, only if every fetch
    /// succeeds, merges, diffs against the current table, swaps the new table
    /// in, then persists it. A storage failure is reported after the swap, so
    /// the fresh table stays usable for this session, and a non-empty change
    /// record is still offered to the audit log.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, PipelineError> {
        let _running = self
            .cycle
            .try_lock()
            .map_err(|_| PipelineError::CycleInProgress)?;

        let (copper, zinc, oil) = try_join3(
            self.fetch(self.sources.copper.as_ref()),
            self.fetch(self.sources.zinc.as_ref()),
            self.fetch(self.sources.oil.as_ref()),
        )
        .await?;

        let merged = merge(&copper.data, &zinc.data, &oil.data);
        let previous = self.current().await;
        let change = detect(&previous, &merged);
        let merged = Arc::new(merged);
        *self.current.write().await = merged.clone();
        info!("Merged {} rows: {}", merged.len(), change.summary);

        // The audit record is written even when the save fails: the cache
        // already holds the new table, so the next diff will not repeat it.
        let storage = self.storage.lock().await;
        let saved = storage.save_table(&merged);
        if !change.is_empty() {
            if let Err(e) = storage.append_change(&change) {
                error!("Failed to append change record: {}", e);
                saved?;
                return Err(e.into());
            }
        }
        let saved = saved?;

        Ok(CycleOutcome {
            rows: merged.len(),
            saved,
            change,
        })
    }

    async fn fetch(&self, source: &dyn PriceSource) -> Result<FetchResult, PipelineError> {
        let commodity = source.commodity();
        let started = Instant::now();
        let result = source.fetch().await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (status, records, err_text) = match &result {
            Ok(fetched) => (FetchStatus::Success, fetched.data.len(), None),
            Err(e) => (FetchStatus::Failed, 0, Some(e.to_string())),
        };
        if let Err(e) = self.storage.lock().await.log_fetch(
            commodity,
            status,
            records,
            err_text.as_deref(),
            duration_ms,
        ) {
            warn!("Fetch log write failed for {}: {}", commodity, e);
        }

        result.map_err(|source| PipelineError::Fetch { commodity, source })
    }
}

/// Runs a cycle immediately, then again every `every` or whenever `refresh`
/// is notified. Overlapping triggers are rejected by the pipeline itself.
pub fn spawn_scheduler<R>(
    pipeline: Arc<Pipeline<R>>,
    every: Duration,
    refresh: Arc<Notify>,
    display: DisplayConfig,
) -> JoinHandle<()>
where
    R: PriceRepository + 'static,
{
    tokio::spawn(async move {
        loop {
            info!("Starting fetch cycle...");
            match pipeline.run_cycle().await {
                Ok(outcome) => {
                    info!(
                        "Cycle done: {} rows, {} values saved. {}",
                        outcome.rows, outcome.saved, outcome.change.summary
                    );
                    for line in &outcome.change.details {
                        info!("  {}", line);
                    }
                }
                Err(PipelineError::CycleInProgress) => {
                    warn!("Previous cycle still running, skipping.");
                }
                Err(e) => {
                    error!("Cycle failed: {}", e);
                }
            }

            let view = pipeline.view(&display, today()).await;
            info!(
                "Correlations (last 30 paired days): copper/oil {:.3}, zinc/oil {:.3}, copper/zinc {:.3}",
                view.correlations.copper_oil, view.correlations.zinc_oil, view.correlations.copper_zinc
            );

            info!("Waiting for timer ({}s) or manual refresh...", every.as_secs());
            tokio::select! {
                _ = sleep(every) => {
                    info!("Timer triggered.");
                }
                _ = refresh.notified() => {
                    info!("Manual refresh triggered.");
                }
            }
        }
    })
}
