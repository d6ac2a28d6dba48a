//! Short templated narrative for a KPI summary.

use crate::models::kpi::KpiSummary;

pub const NO_REVENUE_LINE: &str = "No revenue detected — check your CSV columns.";
pub const LOYALTY_LINE: &str = "Track repeat customers and consider loyalty offers.";

/// Render the insight lines for a summary, newline-joined.
pub fn generate(kpis: &KpiSummary) -> String {
    let mut lines = Vec::with_capacity(3);

    if kpis.revenue > 0.0 {
        lines.push(format!(
            "Revenue: £{}. Consider a short promotion for the top product.",
            kpis.revenue
        ));
    } else {
        lines.push(NO_REVENUE_LINE.to_string());
    }

    if let Some(top) = kpis.top_skus.first() {
        lines.push(format!(
            "Top SKU: {} (qty {}) — bundle or promote it.",
            top.sku, top.qty
        ));
    }

    lines.push(LOYALTY_LINE.to_string());
    lines.join("\n")
}
