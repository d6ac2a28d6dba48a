//! Offline analysis: run the upload pipeline on a local CSV file.
//!
//! Usage: `cargo run --bin analyze -- path/to/sales.csv`
//!
//! Prints the row count, KPIs and insights as JSON. Nothing is stored.

use anyhow::Context;
use serde_json::json;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: analyze <sales.csv>")?;

    let data = std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;
    let analysis = velvero::services::upload::analyze(&data)?;

    let out = json!({
        "file": path,
        "rows": analysis.rows.len(),
        "kpis": analysis.kpis,
        "insights": analysis.insights,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    Ok(())
}
