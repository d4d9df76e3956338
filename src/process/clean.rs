use std::collections::HashSet;
use tracing::{info, warn};

use crate::process::raw_table::{RawCell, RawTable, EMPTY_CELL};
use crate::schema::{CanonicalRecord, ResolvedSchema};

/// Row counts from one cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub total: usize,
    /// Rows with a null, blank, or uncoercible value in some mapped column.
    pub incomplete: usize,
    pub duplicates: usize,
    pub kept: usize,
}

impl CleanReport {
    pub fn dropped(&self) -> usize {
        self.incomplete + self.duplicates
    }
}

/// Typed view over one raw row through the resolved schema.
struct RowCells<'a> {
    row: &'a [RawCell],
    schema: &'a ResolvedSchema,
}

impl<'a> RowCells<'a> {
    fn cell(&self, canonical: &str) -> &'a RawCell {
        self.schema
            .position(canonical)
            .and_then(|i| self.row.get(i))
            .unwrap_or(&EMPTY_CELL)
    }

    fn text(&self, canonical: &str) -> Option<String> {
        self.cell(canonical).as_text()
    }

    fn int(&self, canonical: &str) -> Option<i64> {
        self.cell(canonical).as_int()
    }

    fn float(&self, canonical: &str) -> Option<f64> {
        self.cell(canonical).as_float()
    }

    fn date(&self, canonical: &str) -> Option<chrono::NaiveDate> {
        self.cell(canonical).as_date()
    }
}

/// Coerce one raw row; `None` if any mapped column is null or mistyped.
pub fn build_record(row: &[RawCell], schema: &ResolvedSchema) -> Option<CanonicalRecord> {
    let c = RowCells { row, schema };
    Some(CanonicalRecord {
        row_id: c.int("row_id")?,
        order_id: c.text("order_id")?,
        order_date: c.date("order_date")?,
        ship_mode: c.text("ship_mode")?,
        ship_date: c.date("ship_date")?,
        customer_id: c.text("customer_id")?,
        customer_name: c.text("customer_name")?,
        segment: c.text("segment")?,
        country_region: c.text("country_region")?,
        city: c.text("city")?,
        state: c.text("state")?,
        postal_code: c.text("postal_code")?,
        region: c.text("region")?,
        product_id: c.text("product_id")?,
        category: c.text("category")?,
        sub_category: c.text("sub_category")?,
        product_name: c.text("product_name")?,
        sales: c.float("sales")?,
        quantity: c.int("quantity")?,
        discount: c.float("discount")?,
        profit: c.float("profit")?,
    })
}

/// Drop incomplete rows, then exact duplicates (first occurrence wins).
pub fn clean(table: &RawTable, schema: &ResolvedSchema) -> (Vec<CanonicalRecord>, CleanReport) {
    let mut report = CleanReport {
        total: table.rows.len(),
        ..Default::default()
    };

    let mut seen = HashSet::with_capacity(table.rows.len());
    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let Some(record) = build_record(row, schema) else {
            report.incomplete += 1;
            continue;
        };
        if !seen.insert(record.identity()) {
            report.duplicates += 1;
            continue;
        }
        records.push(record);
    }
    report.kept = records.len();

    if report.dropped() > 0 {
        warn!(
            incomplete = report.incomplete,
            duplicates = report.duplicates,
            "dropped rows while cleaning"
        );
    }
    info!(total = report.total, kept = report.kept, "cleaned raw rows");

    (records, report)
}
