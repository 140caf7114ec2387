use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{PanelError, PanelResult};

pub const COL_PROVIDER: &str = "NOMBRE PROVEEDOR";
pub const COL_DELIVERY_DATE: &str = "FECHA ENTREGA";
pub const COL_QUANTITY: &str = "CANTIDAD ENTREGADA";
pub const COL_PRODUCT: &str = "PRODUCTO";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> PanelResult<usize> {
        self.column_index(name)
            .ok_or_else(|| PanelError::SourceRejected(format!("missing required column {name}")))
    }

    // Ragged rows read as blank past their end.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: String) {
        if let Some(r) = self.rows.get_mut(row) {
            if r.len() <= column {
                r.resize(column + 1, String::new());
            }
            r[column] = value;
        }
    }
}

// Ties a record to the exact snapshot row it was read from; merges
// refuse ids minted against any other snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowId {
    pub(crate) snapshot: Uuid,
    pub(crate) index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub row_id: RowId,
    pub provider: String,
    pub delivery_date: Option<NaiveDate>,
    pub quantity: Option<f64>,
    pub product: Option<String>,
    pub cells: Vec<String>,
}

impl DeliveryRecord {
    pub fn is_pending(&self) -> bool {
        self.delivery_date.is_none() && self.quantity.is_none()
    }

    pub fn is_fulfilled(&self) -> bool {
        self.delivery_date.is_some() && self.quantity.is_some()
    }
}

// Absent or blank values clear the cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEdit {
    pub row_id: RowId,
    pub delivery_date: Option<String>,
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPartition {
    pub pending: Vec<DeliveryRecord>,
    pub completed: Vec<DeliveryRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub username: String,
    pub display_name: String,
    pub provider: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesGranularity {
    Daily,
    Weekly,
    Monthly,
}

impl SeriesGranularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSignal {
    pub early_avg: f64,
    pub recent_avg: f64,
    pub pct_change: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: String,
    pub total: f64,
    pub mean: f64,
    pub deliveries: usize,
    pub first_delivery: NaiveDate,
    pub last_delivery: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotal {
    pub product: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub count: usize,
    pub total: f64,
    pub mean: Option<f64>,
    pub pending_count: usize,
    pub monthly_summary: Vec<MonthlySummary>,
    pub top_products: Option<Vec<ProductTotal>>,
    pub histogram: Vec<HistogramBin>,
    pub trend: Option<TrendSignal>,
}
