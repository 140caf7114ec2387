use std::sync::Arc;

use crate::auth::CredentialTable;
use crate::errors::{PanelError, PanelResult};
use crate::merge::merge_edits;
use crate::metrics::{compute_metrics, delivery_series};
use crate::models::{
    DeliveryEdit, DeliveryRecord, MetricsReport, Principal, RecordPartition, SeriesGranularity,
    SeriesPoint, COL_PROVIDER,
};
use crate::partition::partition;
use crate::scope::{scope, DatasetSnapshot};
use crate::store::RecordStore;

pub struct PanelCore {
    store: Arc<dyn RecordStore>,
    credentials: CredentialTable,
}

impl PanelCore {
    pub fn new(store: Arc<dyn RecordStore>, credentials: CredentialTable) -> Self {
        Self { store, credentials }
    }

    pub fn login(&self, username: &str, password: &str) -> PanelResult<PanelSession> {
        let principal = self.credentials.authenticate(username, password)?;
        PanelSession::open(Arc::clone(&self.store), principal)
    }
}

#[derive(Debug)]
pub struct PanelSession {
    store: Arc<dyn RecordStore>,
    principal: Principal,
    snapshot: DatasetSnapshot,
    split: RecordPartition,
}

impl PanelSession {
    fn open(store: Arc<dyn RecordStore>, principal: Principal) -> PanelResult<Self> {
        let (snapshot, split) = load_view(store.as_ref(), &principal)?;
        Ok(Self {
            store,
            principal,
            snapshot,
            split,
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn pending(&self) -> &[DeliveryRecord] {
        &self.split.pending
    }

    pub fn completed(&self) -> &[DeliveryRecord] {
        &self.split.completed
    }

    // Mints a new generation; row ids from the previous view go stale.
    pub fn refresh(&mut self) -> PanelResult<()> {
        let (snapshot, split) = load_view(self.store.as_ref(), &self.principal)?;
        self.snapshot = snapshot;
        self.split = split;
        Ok(())
    }

    // Rejected batches leave both the store and this session untouched.
    // Last write wins across sessions.
    pub fn save_edits(&mut self, edits: &[DeliveryEdit]) -> PanelResult<()> {
        self.ensure_owned(edits)?;
        let merged = merge_edits(&self.snapshot, edits)?;
        self.store.write_all(&merged)?;
        if let Err(error) = self.refresh() {
            tracing::warn!(
                provider = %self.principal.provider,
                error = %error,
                "edits were written but the reload failed"
            );
            return Err(error);
        }
        Ok(())
    }

    pub fn metrics(&self) -> MetricsReport {
        let provider_total = self.split.pending.len() + self.split.completed.len();
        compute_metrics(
            &self.split.completed,
            provider_total,
            self.snapshot.has_product_column(),
        )
    }

    pub fn series(&self, granularity: SeriesGranularity) -> Vec<SeriesPoint> {
        delivery_series(&self.split.completed, granularity)
    }

    // Stale and out-of-range ids fall through to the merge engine, which
    // names them; this guard only catches ids pointing at another
    // supplier's row.
    fn ensure_owned(&self, edits: &[DeliveryEdit]) -> PanelResult<()> {
        let sheet = self.snapshot.sheet();
        let provider_col = sheet.require_column(COL_PROVIDER)?;
        for edit in edits {
            let index = edit.row_id.index;
            if edit.row_id.snapshot == self.snapshot.generation()
                && index < sheet.rows.len()
                && sheet.cell(index, provider_col) != self.principal.provider
            {
                return Err(PanelError::Integrity(format!(
                    "row {index} does not belong to {}",
                    self.principal.provider
                )));
            }
        }
        Ok(())
    }
}

fn load_view(
    store: &dyn RecordStore,
    principal: &Principal,
) -> PanelResult<(DatasetSnapshot, RecordPartition)> {
    let sheet = store.read_all()?;
    let snapshot = DatasetSnapshot::new(sheet);
    let records = scope(&snapshot, &principal.provider)?;
    Ok((snapshot, partition(records)))
}

#[cfg(test)]
mod tests {
    use super::PanelCore;
    use crate::auth::{CredentialEntry, CredentialTable};
    use crate::errors::PanelError;
    use crate::models::{DeliveryEdit, RowId, Sheet};
    use crate::store::{MemoryStore, RecordStore};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn credentials() -> CredentialTable {
        let mut entries = BTreeMap::new();
        entries.insert(
            "ana".to_string(),
            CredentialEntry {
                password: "secret".to_string(),
                provider: "Proveedor A".to_string(),
                display_name: None,
            },
        );
        entries.insert(
            "benito".to_string(),
            CredentialEntry {
                password: "hunter2".to_string(),
                provider: "Proveedor B".to_string(),
                display_name: None,
            },
        );
        CredentialTable::new(entries)
    }

    fn sheet() -> Sheet {
        let mut sheet = Sheet::new(vec![
            "NOMBRE PROVEEDOR".into(),
            "FECHA ENTREGA".into(),
            "CANTIDAD ENTREGADA".into(),
            "PRODUCTO".into(),
        ]);
        sheet.rows.push(vec![
            "Proveedor A".into(),
            "12/05/2024".into(),
            "10".into(),
            "Tornillos".into(),
        ]);
        sheet
            .rows
            .push(vec!["Proveedor A".into(), "".into(), "".into(), "".into()]);
        sheet.rows.push(vec![
            "Proveedor B".into(),
            "01/05/2024".into(),
            "4".into(),
            "Tuercas".into(),
        ]);
        sheet
    }

    fn core() -> (Arc<MemoryStore>, PanelCore) {
        let store = Arc::new(MemoryStore::new(sheet()));
        let core = PanelCore::new(store.clone(), credentials());
        (store, core)
    }

    #[test]
    fn login_partitions_the_provider_view() {
        let (_store, core) = core();
        let session = core.login("ana", "secret").unwrap();
        assert_eq!(session.principal().provider, "Proveedor A");
        assert_eq!(session.pending().len(), 1);
        assert_eq!(session.completed().len(), 1);
    }

    #[test]
    fn bad_credentials_do_not_open_a_session() {
        let (_store, core) = core();
        assert!(matches!(
            core.login("ana", "nope").unwrap_err(),
            PanelError::AuthFailure(_)
        ));
    }

    #[test]
    fn unavailable_store_fails_login() {
        let (store, core) = core();
        store.set_available(false);
        assert!(matches!(
            core.login("ana", "secret").unwrap_err(),
            PanelError::SourceUnavailable(_)
        ));
    }

    #[test]
    fn save_edits_completes_a_pending_row() {
        let (store, core) = core();
        let mut session = core.login("ana", "secret").unwrap();
        let pending_id = session.pending()[0].row_id;

        session
            .save_edits(&[DeliveryEdit {
                row_id: pending_id,
                delivery_date: Some("2/6/2024".into()),
                quantity: Some("7".into()),
            }])
            .unwrap();

        assert!(session.pending().is_empty());
        assert_eq!(session.completed().len(), 2);

        let written = store.read_all().unwrap();
        assert_eq!(written.rows[1][1], "02/06/2024");
        assert_eq!(written.rows[1][2], "7");
        assert_eq!(written.rows[2], sheet().rows[2]);
    }

    #[test]
    fn save_rejects_ids_from_a_previous_generation() {
        let (_store, core) = core();
        let mut session = core.login("ana", "secret").unwrap();
        let old_id = session.completed()[0].row_id;
        session.refresh().unwrap();

        let err = session
            .save_edits(&[DeliveryEdit {
                row_id: old_id,
                delivery_date: None,
                quantity: Some("1".into()),
            }])
            .unwrap_err();
        assert!(matches!(err, PanelError::Integrity(_)));
    }

    #[test]
    fn save_rejects_another_suppliers_row() {
        let (store, core) = core();
        let mut session = core.login("ana", "secret").unwrap();
        let foreign = RowId {
            snapshot: session.completed()[0].row_id.snapshot,
            index: 2,
        };

        let err = session
            .save_edits(&[DeliveryEdit {
                row_id: foreign,
                delivery_date: None,
                quantity: Some("999".into()),
            }])
            .unwrap_err();
        assert!(matches!(err, PanelError::Integrity(_)));
        assert_eq!(store.read_all().unwrap(), sheet());
    }

    #[test]
    fn rejected_batch_leaves_store_untouched() {
        let (store, core) = core();
        let mut session = core.login("ana", "secret").unwrap();
        let id = session.completed()[0].row_id;

        let err = session
            .save_edits(&[DeliveryEdit {
                row_id: id,
                delivery_date: Some("01/06/2024".into()),
                quantity: Some("-2".into()),
            }])
            .unwrap_err();
        assert!(matches!(err, PanelError::Validation(_)));
        assert_eq!(store.read_all().unwrap(), sheet());
    }

    #[test]
    fn metrics_cover_only_this_provider() {
        let (_store, core) = core();
        let session = core.login("ana", "secret").unwrap();
        let report = session.metrics();
        assert_eq!(report.count, 1);
        assert_eq!(report.total, 10.0);
        assert_eq!(report.pending_count, 1);
        assert!(report.top_products.is_some());
    }

    #[test]
    fn last_write_wins_across_sessions() {
        let (store, core) = core();
        let mut ana = core.login("ana", "secret").unwrap();
        let mut benito = core.login("benito", "hunter2").unwrap();

        let ana_row = ana.completed()[0].row_id;
        ana.save_edits(&[DeliveryEdit {
            row_id: ana_row,
            delivery_date: Some("12/05/2024".into()),
            quantity: Some("11".into()),
        }])
        .unwrap();

        // Benito merges against the snapshot he loaded before Ana's
        // write; his full-sheet write silently reverts her change.
        let benito_row = benito.completed()[0].row_id;
        benito
            .save_edits(&[DeliveryEdit {
                row_id: benito_row,
                delivery_date: Some("01/05/2024".into()),
                quantity: Some("5".into()),
            }])
            .unwrap();

        let written = store.read_all().unwrap();
        assert_eq!(written.rows[0][2], "10");
        assert_eq!(written.rows[2][2], "5");
    }
}
