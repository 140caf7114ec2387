mod csv;
mod memory;
mod sqlite;

pub use self::csv::CsvStore;
pub use self::memory::MemoryStore;
pub use self::sqlite::SqliteStore;

use crate::errors::PanelResult;
use crate::models::Sheet;

// One call loads the full dataset, one call replaces it. Adapters
// synchronize internally so a shared instance can back several sessions.
pub trait RecordStore: std::fmt::Debug + Send + Sync {
    fn read_all(&self) -> PanelResult<Sheet>;
    fn write_all(&self, sheet: &Sheet) -> PanelResult<()>;
}
