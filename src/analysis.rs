use std::cmp::Ordering;

use itertools::Itertools;

use crate::model::StockRecord;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_stocks: usize,
    pub total_volume: f64,
    pub top_gainer: Option<StockRecord>,
    pub top_loser: Option<StockRecord>,
}

/// Counts, volume and the extremes by change. Records without a change rank
/// as 0 and equal changes keep their input order.
pub fn compute_stats(records: &[StockRecord]) -> SummaryStats {
    let total_volume: f64 = records.iter().filter_map(|r| r.volume).sum();

    let by_change = records
        .iter()
        .sorted_by(|a, b| {
            b.change_or_zero()
                .partial_cmp(&a.change_or_zero())
                .unwrap_or(Ordering::Equal)
        })
        .collect_vec();

    SummaryStats {
        total_stocks: records.len(),
        total_volume,
        top_gainer: by_change.first().map(|r| (*r).clone()),
        top_loser: by_change.last().map(|r| (*r).clone()),
    }
}

/// Case-insensitive substring match on code or name. An empty query keeps
/// everything.
pub fn filter<'a>(records: &'a [StockRecord], query: &str) -> Vec<&'a StockRecord> {
    let query = query.to_lowercase();

    records
        .iter()
        .filter(|r| {
            r.stock_code.to_lowercase().contains(&query)
                || r.stock_name.to_lowercase().contains(&query)
        })
        .collect()
}
