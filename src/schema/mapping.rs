// src/schema/mapping.rs

use std::collections::HashMap;

use crate::error::SchemaMismatchError;

/// Raw spreadsheet header → canonical column name, in canonical column order.
pub static SCHEMA_MAPPING: &[(&str, &str)] = &[
    ("Row ID", "row_id"),
    ("Order ID", "order_id"),
    ("Order Date", "order_date"),
    ("Ship Mode", "ship_mode"),
    ("Ship Date", "ship_date"),
    ("Customer ID", "customer_id"),
    ("Customer Name", "customer_name"),
    ("Segment", "segment"),
    ("Country/Region", "country_region"),
    ("City", "city"),
    ("State", "state"),
    ("Postal Code", "postal_code"),
    ("Region", "region"),
    ("Product ID", "product_id"),
    ("Category", "category"),
    ("Sub-Category", "sub_category"),
    ("Product Name", "product_name"),
    ("Sales", "sales"),
    ("Quantity", "quantity"),
    ("Discount", "discount"),
    ("Profit", "profit"),
];

/// Canonical column names in output order.
pub fn canonical_columns() -> impl Iterator<Item = &'static str> {
    SCHEMA_MAPPING.iter().map(|(_, canonical)| *canonical)
}

/// Canonical name for a raw header, if the mapping knows it.
pub fn canonical_name(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    SCHEMA_MAPPING
        .iter()
        .find(|(r, _)| *r == raw)
        .map(|(_, canonical)| *canonical)
}

/// Where each mapped column sits in a particular raw header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    /// `positions[i]` is the raw column index of `SCHEMA_MAPPING[i]`.
    positions: Vec<usize>,
}

impl ResolvedSchema {
    /// Raw column index holding `canonical`, `None` for names outside the
    /// mapping.
    pub fn position(&self, canonical: &str) -> Option<usize> {
        SCHEMA_MAPPING
            .iter()
            .position(|(_, c)| *c == canonical)
            .map(|idx| self.positions[idx])
    }

    /// Raw indices in canonical order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }
}

/// Match a raw header row against the mapping.
///
/// Every mapped raw column must be present; unmapped raw columns are ignored
/// and never reach the processed artifact. If a raw name repeats, the first
/// occurrence wins.
pub fn resolve_headers(headers: &[String]) -> Result<ResolvedSchema, SchemaMismatchError> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(headers.len());
    for (i, h) in headers.iter().enumerate() {
        index.entry(h.trim()).or_insert(i);
    }

    let mut positions = Vec::with_capacity(SCHEMA_MAPPING.len());
    let mut missing = Vec::new();
    for (raw, _) in SCHEMA_MAPPING {
        match index.get(raw) {
            Some(&i) => positions.push(i),
            None => missing.push(raw.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(SchemaMismatchError { missing });
    }
    Ok(ResolvedSchema { positions })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_headers() -> Vec<String> {
        SCHEMA_MAPPING.iter().map(|(r, _)| r.to_string()).collect()
    }

    #[test]
    fn mapping_is_one_to_one() {
        let mut raws: Vec<_> = SCHEMA_MAPPING.iter().map(|(r, _)| *r).collect();
        let mut canon: Vec<_> = canonical_columns().collect();
        raws.sort_unstable();
        raws.dedup();
        canon.sort_unstable();
        canon.dedup();
        assert_eq!(raws.len(), SCHEMA_MAPPING.len());
        assert_eq!(canon.len(), SCHEMA_MAPPING.len());
        assert_eq!(canonical_name(" Sub-Category "), Some("sub_category"));
        assert_eq!(canonical_name("Sub Category"), None);
    }

    #[test]
    fn resolves_shuffled_headers_with_extras() {
        let mut headers = raw_headers();
        headers.reverse();
        headers.insert(3, "Manager".to_string());

        let schema = resolve_headers(&headers).unwrap();
        let pos = schema.position("row_id").unwrap();
        assert_eq!(headers[pos], "Row ID");
        let pos = schema.position("profit").unwrap();
        assert_eq!(headers[pos], "Profit");
        assert!(!schema.positions().contains(&3));
        assert_eq!(schema.position("Row ID"), None);
        assert_eq!(schema.position("manager"), None);
    }

    #[test]
    fn reports_every_missing_column() {
        let headers: Vec<String> = raw_headers()
            .into_iter()
            .filter(|h| h != "Region" && h != "Order Date")
            .collect();

        let err = resolve_headers(&headers).unwrap_err();
        assert_eq!(err.missing, vec!["Order Date".to_string(), "Region".to_string()]);
    }
}
