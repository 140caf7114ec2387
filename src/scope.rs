use uuid::Uuid;

use crate::cells::{parse_date, parse_quantity};
use crate::errors::PanelResult;
use crate::models::{
    DeliveryRecord, RowId, Sheet, COL_DELIVERY_DATE, COL_PRODUCT, COL_PROVIDER, COL_QUANTITY,
};

// One load of the backing sheet, tagged with a freshly minted generation
// token. Row ids minted here are honored only against this snapshot.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    generation: Uuid,
    sheet: Sheet,
}

impl DatasetSnapshot {
    pub fn new(sheet: Sheet) -> Self {
        Self {
            generation: Uuid::new_v4(),
            sheet,
        }
    }

    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn row_id(&self, index: usize) -> RowId {
        RowId {
            snapshot: self.generation,
            index,
        }
    }

    pub fn has_product_column(&self) -> bool {
        self.sheet.column_index(COL_PRODUCT).is_some()
    }
}

pub fn scope(snapshot: &DatasetSnapshot, provider: &str) -> PanelResult<Vec<DeliveryRecord>> {
    let sheet = snapshot.sheet();
    let provider_col = sheet.require_column(COL_PROVIDER)?;
    let date_col = sheet.require_column(COL_DELIVERY_DATE)?;
    let quantity_col = sheet.require_column(COL_QUANTITY)?;
    let product_col = sheet.column_index(COL_PRODUCT);

    let mut records = Vec::new();
    for (index, row) in sheet.rows.iter().enumerate() {
        if sheet.cell(index, provider_col) != provider {
            continue;
        }
        let product = product_col.and_then(|col| {
            let cell = sheet.cell(index, col).trim();
            (!cell.is_empty()).then(|| cell.to_string())
        });
        records.push(DeliveryRecord {
            row_id: snapshot.row_id(index),
            provider: provider.to_string(),
            delivery_date: parse_date(sheet.cell(index, date_col)),
            quantity: parse_quantity(sheet.cell(index, quantity_col)),
            product,
            cells: row.clone(),
        });
    }
    Ok(records)
}
