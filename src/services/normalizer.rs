//! Column-synonym resolution and numeric coercion for uploaded sales rows.
//!
//! Real-world exports name the same field many ways. Each logical field has
//! an ordered list of candidate column names; the first candidate found in
//! the row wins. Nothing here fails: missing or malformed values degrade to
//! zero or `None`.

use chrono::Utc;

use crate::models::sale::{NormalizedSale, RawRow, UNKNOWN_SKU};

/// Columns holding a row's monetary total.
pub const TOTAL_COLUMNS: &[&str] = &["total_amount", "total", "amount"];
/// Columns holding a per-unit price, used as a total only when no quantity is given.
pub const PRICE_COLUMNS: &[&str] = &["unit_price", "price"];
pub const QUANTITY_COLUMNS: &[&str] = &["quantity", "qty"];
pub const SKU_COLUMNS: &[&str] = &["sku", "item", "product", "product_name"];
pub const PRODUCT_NAME_COLUMNS: &[&str] = &["product_name", "product", "item"];
pub const DATE_COLUMNS: &[&str] = &["date", "order_date", "transaction_date"];
pub const ORDER_ID_COLUMNS: &[&str] = &["order_id", "order", "transaction_id"];
pub const PAYMENT_TYPE_COLUMNS: &[&str] = &["payment_type", "payment", "payment_method"];
pub const STAFF_COLUMNS: &[&str] = &["staff", "employee", "cashier"];

/// Order in which a lone price column stands in for the total.
const LONE_PRICE_COLUMNS: &[&str] = &["price", "unit_price"];

/// Characters removed before parsing a number.
const STRIPPED_SYMBOLS: &[char] = &['£', ','];

/// First candidate column present in the row whose value satisfies `accept`.
pub fn first_value<'a>(
    row: &'a RawRow,
    candidates: &[&str],
    accept: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|column| row.get(column))
        .find(|value| accept(value))
}

/// First candidate column present in the row, even if its value is empty.
pub fn first_present<'a>(row: &'a RawRow, candidates: &[&str]) -> Option<&'a str> {
    first_value(row, candidates, |_| true)
}

/// First candidate column present in the row with a non-empty value.
pub fn first_filled<'a>(row: &'a RawRow, candidates: &[&str]) -> Option<&'a str> {
    first_value(row, candidates, |value| !value.is_empty())
}

/// Best-effort numeric conversion: strips `£` and `,`, then reads the leading
/// number. Anything without a finite leading number is 0.
pub fn coerce_number(value: Option<&str>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    let cleaned: String = value.chars().filter(|c| !STRIPPED_SYMBOLS.contains(c)).collect();
    let cleaned = cleaned.trim();
    let prefix = &cleaned[..numeric_prefix_len(cleaned)];
    match prefix.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Length of the longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

/// Monetary total for a row, `None` when no total-like shape matches.
///
/// An explicit total column wins even when it coerces to 0. Without one,
/// quantity × unit price is used when both are filled in, and a lone price
/// column is taken as the total otherwise.
pub fn resolve_total(row: &RawRow) -> Option<f64> {
    if let Some(total) = first_present(row, TOTAL_COLUMNS) {
        return Some(coerce_number(Some(total)));
    }
    let quantity = first_filled(row, QUANTITY_COLUMNS);
    let price = first_filled(row, PRICE_COLUMNS);
    if let (Some(quantity), Some(price)) = (quantity, price) {
        return Some(coerce_number(Some(quantity)) * coerce_number(Some(price)));
    }
    first_present(row, LONE_PRICE_COLUMNS).map(|price| coerce_number(Some(price)))
}

/// Row total used for revenue; rows matching no shape contribute 0.
pub fn row_total(row: &RawRow) -> f64 {
    resolve_total(row).unwrap_or(0.0)
}

pub fn resolve_sku(row: &RawRow) -> String {
    first_filled(row, SKU_COLUMNS)
        .unwrap_or(UNKNOWN_SKU)
        .to_string()
}

/// Units a row adds to its SKU's ranking. Missing or zero quantity counts as 1.
pub fn ranking_quantity(row: &RawRow) -> f64 {
    match coerce_number(first_filled(row, QUANTITY_COLUMNS)) {
        q if q == 0.0 => 1.0,
        q => q,
    }
}

/// Integer quantity for storage: every non-digit character is dropped.
pub fn stored_quantity(row: &RawRow) -> Option<i64> {
    let digits: String = first_filled(row, QUANTITY_COLUMNS)?
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn optional_text(row: &RawRow, candidates: &[&str]) -> Option<String> {
    first_filled(row, candidates).map(str::to_string)
}

/// Map one raw row onto the canonical sale shape.
pub fn normalize(row: &RawRow) -> NormalizedSale {
    NormalizedSale {
        date: optional_text(row, DATE_COLUMNS),
        order_id: optional_text(row, ORDER_ID_COLUMNS),
        sku: resolve_sku(row),
        product_name: optional_text(row, PRODUCT_NAME_COLUMNS),
        quantity: stored_quantity(row),
        unit_price: first_filled(row, PRICE_COLUMNS).map(|p| coerce_number(Some(p))),
        total_amount: resolve_total(row),
        payment_type: optional_text(row, PAYMENT_TYPE_COLUMNS),
        staff: optional_text(row, STAFF_COLUMNS),
        created_at: Utc::now(),
    }
}
