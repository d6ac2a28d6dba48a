//! Business metrics derived from one uploaded sales file.

use serde::{Deserialize, Serialize, Serializer};

/// Largest magnitude at which every integer is exactly representable in an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Headline metrics for one upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    #[serde(serialize_with = "serialize_amount")]
    pub revenue: f64,
    /// Number of rows in the file, not distinct order ids.
    pub orders: usize,
    #[serde(serialize_with = "serialize_amount")]
    pub aov: f64,
    pub top_skus: Vec<TopSku>,
}

/// A SKU and its accumulated ranking quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSku {
    pub sku: String,
    #[serde(serialize_with = "serialize_amount")]
    pub qty: f64,
}

/// Emit whole amounts as JSON integers (`25`, not `25.0`).
pub fn serialize_amount<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_amounts_serialize_as_integers() {
        let summary = KpiSummary {
            revenue: 25.0,
            orders: 2,
            aov: 12.5,
            top_skus: vec![TopSku {
                sku: "A".to_string(),
                qty: 2.0,
            }],
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({"revenue": 25, "orders": 2, "aov": 12.5, "top_skus": [{"sku": "A", "qty": 2}]})
        );
    }

    #[test]
    fn default_is_all_zero() {
        let value = serde_json::to_value(KpiSummary::default()).unwrap();
        assert_eq!(value, json!({"revenue": 0, "orders": 0, "aov": 0, "top_skus": []}));
    }
}
