pub mod auth;
pub mod cells;
pub mod errors;
pub mod merge;
pub mod metrics;
pub mod models;
pub mod partition;
pub mod scope;
pub mod session;
pub mod store;

pub use auth::{CredentialEntry, CredentialTable};
pub use errors::{PanelError, PanelResult};
pub use merge::merge_edits;
pub use metrics::{compute_metrics, delivery_series};
pub use models::{
    DeliveryEdit, DeliveryRecord, HistogramBin, MetricsReport, MonthlySummary, Principal,
    ProductTotal, RecordPartition, RowId, SeriesGranularity, SeriesPoint, Sheet, TrendDirection,
    TrendSignal, COL_DELIVERY_DATE, COL_PRODUCT, COL_PROVIDER, COL_QUANTITY,
};
pub use partition::partition;
pub use scope::{scope, DatasetSnapshot};
pub use session::{PanelCore, PanelSession};
pub use store::{CsvStore, MemoryStore, RecordStore, SqliteStore};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

// Installs the daily-rolling JSON log writer; the embedding shell calls
// this once at startup.
pub fn init_tracing(data_dir: &Path) -> PanelResult<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "panel.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| PanelError::Internal(error.to_string()))
}
