//! KPI aggregation over the rows of one upload.

use indexmap::IndexMap;

use crate::models::kpi::{KpiSummary, TopSku};
use crate::models::sale::RawRow;
use crate::services::normalizer;

/// Number of SKUs kept in the ranking.
pub const TOP_SKU_LIMIT: usize = 5;

/// Round to two decimal places, halves toward positive infinity.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Average order value, 0 when there are no orders.
pub fn average_order_value(revenue: f64, orders: usize) -> f64 {
    if orders == 0 {
        return 0.0;
    }
    round2(revenue / orders as f64)
}

/// Highest quantities first; equal quantities keep first-seen order.
fn top_skus(tally: IndexMap<String, f64>, limit: usize) -> Vec<TopSku> {
    let mut ranked: Vec<TopSku> = tally
        .into_iter()
        .filter(|(_, qty)| *qty != 0.0)
        .map(|(sku, qty)| TopSku { sku, qty })
        .collect();
    ranked.sort_by(|a, b| b.qty.total_cmp(&a.qty));
    ranked.truncate(limit);
    ranked
}

/// Fold the rows into revenue, order count, AOV and the top SKUs.
pub fn summarize(rows: &[RawRow]) -> KpiSummary {
    let mut revenue = 0.0;
    let mut tally: IndexMap<String, f64> = IndexMap::new();

    for row in rows {
        revenue += normalizer::row_total(row);
        *tally.entry(normalizer::resolve_sku(row)).or_insert(0.0) +=
            normalizer::ranking_quantity(row);
    }

    let orders = rows.len();
    let revenue = round2(revenue);
    KpiSummary {
        revenue,
        orders,
        aov: average_order_value(revenue, orders),
        top_skus: top_skus(tally, TOP_SKU_LIMIT),
    }
}
