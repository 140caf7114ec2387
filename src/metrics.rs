use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{
    DeliveryRecord, HistogramBin, MetricsReport, MonthlySummary, ProductTotal, SeriesGranularity,
    SeriesPoint, TrendDirection, TrendSignal,
};

pub const TREND_WINDOW: usize = 3;
pub const TREND_UP_THRESHOLD: f64 = 10.0;
pub const TREND_DOWN_THRESHOLD: f64 = -10.0;
pub const TOP_PRODUCT_LIMIT: usize = 5;
pub const HISTOGRAM_BINS: usize = 10;

#[derive(Clone, Copy)]
struct FulfilledDelivery<'a> {
    date: NaiveDate,
    quantity: f64,
    product: Option<&'a str>,
}

// The metric basis is the fulfilled subset: rows carrying both a date
// and a quantity. `provider_total` is the provider's full record count,
// so everything not yet fulfilled reads as pending.
pub fn compute_metrics(
    completed: &[DeliveryRecord],
    provider_total: usize,
    product_column: bool,
) -> MetricsReport {
    let fulfilled = fulfilled_deliveries(completed);
    let chronological = date_sorted(&fulfilled);
    let count = fulfilled.len();
    let total: f64 = fulfilled.iter().map(|f| f.quantity).sum();
    let mean = (count > 0).then(|| total / count as f64);
    let quantities: Vec<f64> = fulfilled.iter().map(|f| f.quantity).collect();

    MetricsReport {
        count,
        total,
        mean,
        pending_count: provider_total.saturating_sub(count),
        monthly_summary: monthly_summary(&chronological),
        top_products: product_column.then(|| top_products(&fulfilled)),
        histogram: histogram(&quantities),
        trend: trend(&chronological),
    }
}

pub fn delivery_series(
    completed: &[DeliveryRecord],
    granularity: SeriesGranularity,
) -> Vec<SeriesPoint> {
    let fulfilled = date_sorted(&fulfilled_deliveries(completed));
    match granularity {
        SeriesGranularity::Daily => fulfilled
            .iter()
            .map(|f| SeriesPoint {
                label: f.date.to_string(),
                quantity: f.quantity,
            })
            .collect(),
        SeriesGranularity::Weekly => {
            let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
            for f in &fulfilled {
                let week = f.date.iso_week();
                *buckets.entry((week.year(), week.week())).or_default() += f.quantity;
            }
            buckets
                .into_iter()
                .map(|((year, week), quantity)| SeriesPoint {
                    label: format!("{year}-W{week:02}"),
                    quantity,
                })
                .collect()
        }
        SeriesGranularity::Monthly => {
            let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
            for f in &fulfilled {
                *buckets.entry((f.date.year(), f.date.month())).or_default() += f.quantity;
            }
            buckets
                .into_iter()
                .map(|((year, month), quantity)| SeriesPoint {
                    label: format!("{year}-{month:02}"),
                    quantity,
                })
                .collect()
        }
    }
}

// Keeps the provider's original row order.
fn fulfilled_deliveries(records: &[DeliveryRecord]) -> Vec<FulfilledDelivery<'_>> {
    records
        .iter()
        .filter_map(|record| match (record.delivery_date, record.quantity) {
            (Some(date), Some(quantity)) => Some(FulfilledDelivery {
                date,
                quantity,
                product: record.product.as_deref(),
            }),
            _ => None,
        })
        .collect()
}

fn date_sorted<'a>(fulfilled: &[FulfilledDelivery<'a>]) -> Vec<FulfilledDelivery<'a>> {
    let mut chronological = fulfilled.to_vec();
    // Stable sort keeps ties in original row order.
    chronological.sort_by_key(|f| f.date);
    chronological
}

fn monthly_summary(chronological: &[FulfilledDelivery]) -> Vec<MonthlySummary> {
    let mut buckets: BTreeMap<(i32, u32), Vec<FulfilledDelivery>> = BTreeMap::new();
    for f in chronological {
        buckets
            .entry((f.date.year(), f.date.month()))
            .or_default()
            .push(*f);
    }
    buckets
        .into_iter()
        .filter_map(|((year, month), entries)| {
            let (first, last) = match (entries.first(), entries.last()) {
                (Some(first), Some(last)) => (first.date, last.date),
                _ => return None,
            };
            let total: f64 = entries.iter().map(|e| e.quantity).sum();
            let deliveries = entries.len();
            Some(MonthlySummary {
                month: format!("{year}-{month:02}"),
                total,
                mean: total / deliveries as f64,
                deliveries,
                first_delivery: first,
                last_delivery: last,
            })
        })
        .collect()
}

fn top_products(fulfilled: &[FulfilledDelivery]) -> Vec<ProductTotal> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for f in fulfilled {
        if let Some(product) = f.product {
            match totals.iter_mut().find(|(name, _)| name == product) {
                Some((_, sum)) => *sum += f.quantity,
                None => totals.push((product.to_string(), f.quantity)),
            }
        }
    }
    // Stable sort keeps tied totals in first-appearance order.
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals.truncate(TOP_PRODUCT_LIMIT);
    totals
        .into_iter()
        .map(|(product, quantity)| ProductTotal { product, quantity })
        .collect()
}

fn histogram(quantities: &[f64]) -> Vec<HistogramBin> {
    if quantities.is_empty() {
        return Vec::new();
    }
    let min = quantities.iter().copied().fold(f64::INFINITY, f64::min);
    let max = quantities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: quantities.len(),
        }];
    }
    let width = (max - min) / HISTOGRAM_BINS as f64;
    let mut bins: Vec<HistogramBin> = (0..HISTOGRAM_BINS)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for &quantity in quantities {
        let slot = (((quantity - min) / width) as usize).min(HISTOGRAM_BINS - 1);
        bins[slot].count += 1;
    }
    bins
}

fn trend(chronological: &[FulfilledDelivery]) -> Option<TrendSignal> {
    if chronological.len() < TREND_WINDOW {
        return None;
    }
    let early_avg = window_mean(&chronological[..TREND_WINDOW]);
    let recent_avg = window_mean(&chronological[chronological.len() - TREND_WINDOW..]);
    let pct_change = if early_avg > 0.0 {
        (recent_avg - early_avg) / early_avg * 100.0
    } else {
        0.0
    };
    let direction = if pct_change > TREND_UP_THRESHOLD {
        TrendDirection::Increasing
    } else if pct_change < TREND_DOWN_THRESHOLD {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };
    Some(TrendSignal {
        early_avg,
        recent_avg,
        pct_change,
        direction,
    })
}

fn window_mean(window: &[FulfilledDelivery]) -> f64 {
    window.iter().map(|f| f.quantity).sum::<f64>() / window.len() as f64
}
