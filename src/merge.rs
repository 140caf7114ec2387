use crate::cells::{format_date, format_quantity, parse_date, parse_number};
use crate::errors::{PanelError, PanelResult};
use crate::models::{DeliveryEdit, Sheet, COL_DELIVERY_DATE, COL_QUANTITY};
use crate::scope::DatasetSnapshot;

struct ResolvedEdit {
    index: usize,
    date_cell: String,
    quantity_cell: String,
}

// Every edit is validated before anything is built; one bad edit rejects
// the whole batch. Only the two editable cells of addressed rows change.
pub fn merge_edits(snapshot: &DatasetSnapshot, edits: &[DeliveryEdit]) -> PanelResult<Sheet> {
    let sheet = snapshot.sheet();
    let date_col = sheet.require_column(COL_DELIVERY_DATE)?;
    let quantity_col = sheet.require_column(COL_QUANTITY)?;

    let mut resolved = Vec::with_capacity(edits.len());
    for edit in edits {
        if edit.row_id.snapshot != snapshot.generation() {
            return Err(PanelError::Integrity(format!(
                "row {} belongs to a stale load; reload and retry",
                edit.row_id.index
            )));
        }
        let index = edit.row_id.index;
        if index >= sheet.rows.len() {
            return Err(PanelError::Integrity(format!(
                "row {index} is not present in the dataset"
            )));
        }
        resolved.push(ResolvedEdit {
            index,
            date_cell: canonical_date_cell(index, edit.delivery_date.as_deref())?,
            quantity_cell: canonical_quantity_cell(index, edit.quantity.as_deref())?,
        });
    }

    let mut merged = sheet.clone();
    for edit in resolved {
        merged.set_cell(edit.index, date_col, edit.date_cell);
        merged.set_cell(edit.index, quantity_col, edit.quantity_cell);
    }
    Ok(merged)
}

fn canonical_date_cell(index: usize, raw: Option<&str>) -> PanelResult<String> {
    let value = raw.unwrap_or("").trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    let date = parse_date(value).ok_or_else(|| {
        PanelError::Validation(format!(
            "row {index}, column {COL_DELIVERY_DATE}: {value:?} is not a recognizable date"
        ))
    })?;
    Ok(format_date(date))
}

fn canonical_quantity_cell(index: usize, raw: Option<&str>) -> PanelResult<String> {
    let value = raw.unwrap_or("").trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    let quantity = parse_number(value).ok_or_else(|| {
        PanelError::Validation(format!(
            "row {index}, column {COL_QUANTITY}: {value:?} is not a number"
        ))
    })?;
    if quantity < 0.0 {
        return Err(PanelError::Validation(format!(
            "row {index}, column {COL_QUANTITY}: negative quantity {value}"
        )));
    }
    Ok(format_quantity(quantity))
}
