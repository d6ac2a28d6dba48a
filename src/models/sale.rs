//! Uploaded sales rows: the raw CSV record and its normalized form.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// SKU recorded when no SKU-like column carries a value.
pub const UNKNOWN_SKU: &str = "UNKNOWN";

/// One parsed CSV record keyed by header name, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawRow(IndexMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value. A repeated column keeps its first position and the last value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    /// Value of a column, `None` when the header has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Canonical transaction shape written to the `sales` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSale {
    pub date: Option<String>,
    pub order_id: Option<String>,
    pub sku: String,
    pub product_name: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub total_amount: Option<f64>,
    pub payment_type: Option<String>,
    pub staff: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_none_for_missing_column() {
        let row: RawRow = [("sku", "A")].into_iter().collect();
        assert_eq!(row.get("sku"), Some("A"));
        assert_eq!(row.get("qty"), None);
    }

    #[test]
    fn repeated_column_keeps_last_value() {
        let row: RawRow = [("sku", "A"), ("qty", "1"), ("sku", "B")]
            .into_iter()
            .collect();
        assert_eq!(row.get("sku"), Some("B"));
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"sku":"B","qty":"1"}"#);
    }

    #[test]
    fn serializes_in_header_order() {
        let row: RawRow = [("sku", "A"), ("quantity", "2"), ("amount", "10")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"sku":"A","quantity":"2","amount":"10"}"#);
    }
}
