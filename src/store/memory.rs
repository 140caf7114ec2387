use std::sync::Mutex;

use super::RecordStore;
use crate::errors::{PanelError, PanelResult};
use crate::models::Sheet;

#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    sheet: Sheet,
    available: bool,
}

impl MemoryStore {
    pub fn new(sheet: Sheet) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                sheet,
                available: true,
            }),
        }
    }

    pub fn set_available(&self, available: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.available = available;
        }
    }
}

impl RecordStore for MemoryStore {
    fn read_all(&self) -> PanelResult<Sheet> {
        let state = lock(&self.state)?;
        if !state.available {
            return Err(PanelError::SourceUnavailable(
                "memory store offline".to_string(),
            ));
        }
        Ok(state.sheet.clone())
    }

    fn write_all(&self, sheet: &Sheet) -> PanelResult<()> {
        let mut state = lock(&self.state)?;
        if !state.available {
            return Err(PanelError::SourceUnavailable(
                "memory store offline".to_string(),
            ));
        }
        state.sheet = sheet.clone();
        Ok(())
    }
}

fn lock(state: &Mutex<MemoryState>) -> PanelResult<std::sync::MutexGuard<'_, MemoryState>> {
    state
        .lock()
        .map_err(|_| PanelError::Internal("record store mutex poisoned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::errors::PanelError;
    use crate::models::Sheet;
    use crate::store::RecordStore;

    #[test]
    fn reads_back_what_was_written() {
        let store = MemoryStore::new(Sheet::default());
        let mut sheet = Sheet::new(vec!["NOMBRE PROVEEDOR".into()]);
        sheet.rows.push(vec!["Proveedor A".into()]);
        store.write_all(&sheet).unwrap();
        assert_eq!(store.read_all().unwrap(), sheet);
    }

    #[test]
    fn offline_store_is_unavailable() {
        let store = MemoryStore::new(Sheet::default());
        store.set_available(false);
        assert!(matches!(
            store.read_all().unwrap_err(),
            PanelError::SourceUnavailable(_)
        ));
        assert!(matches!(
            store.write_all(&Sheet::default()).unwrap_err(),
            PanelError::SourceUnavailable(_)
        ));

        store.set_available(true);
        assert!(store.read_all().is_ok());
    }
}
