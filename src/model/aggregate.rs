use serde::Serialize;
use std::{borrow::Cow, collections::HashMap, path::Path};
use tracing::info;

use crate::error::ExportError;
use crate::model::dataset::Dataset;
use crate::process::export::write_csv_atomic;
use crate::schema::CanonicalRecord;

/// Total sales for one group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub sales: f64,
}

/// Sales for one region → category → sub-category leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyRow {
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub sales: f64,
}

/// Per-row sales/profit pair, sized by quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalesPoint {
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
}

/// Sum `sales` per key, groups in first-seen order.
fn sum_sales_by<'a, F>(records: &'a [CanonicalRecord], key: F) -> Vec<GroupTotal>
where
    F: Fn(&'a CanonicalRecord) -> Cow<'a, str>,
{
    let mut slots: HashMap<Cow<'a, str>, usize> = HashMap::new();
    let mut out: Vec<GroupTotal> = Vec::new();
    for r in records {
        let k = key(r);
        match slots.get(&k) {
            Some(&i) => out[i].sales += r.sales,
            None => {
                slots.insert(k.clone(), out.len());
                out.push(GroupTotal {
                    key: k.into_owned(),
                    sales: r.sales,
                });
            }
        }
    }
    out
}

impl Dataset {
    pub fn category_data(&self) -> Vec<GroupTotal> {
        sum_sales_by(self.records(), |r| Cow::Borrowed(r.category.as_str()))
    }

    pub fn region_data(&self) -> Vec<GroupTotal> {
        sum_sales_by(self.records(), |r| Cow::Borrowed(r.region.as_str()))
    }

    pub fn segment_data(&self) -> Vec<GroupTotal> {
        sum_sales_by(self.records(), |r| Cow::Borrowed(r.segment.as_str()))
    }

    /// Monthly sales keyed by `YYYY: Mon`.
    pub fn time_series_data(&self) -> Vec<GroupTotal> {
        sum_sales_by(self.records(), |r| Cow::Owned(r.month_year()))
    }

    /// Region → category → sub-category sales, leaves in first-seen order.
    pub fn hierarchy_data(&self) -> Vec<HierarchyRow> {
        let mut slots: HashMap<(&str, &str, &str), usize> = HashMap::new();
        let mut out: Vec<HierarchyRow> = Vec::new();
        for r in self.records() {
            let k = (r.region.as_str(), r.category.as_str(), r.sub_category.as_str());
            if let Some(&i) = slots.get(&k) {
                out[i].sales += r.sales;
                continue;
            }
            slots.insert(k, out.len());
            out.push(HierarchyRow {
                region: r.region.clone(),
                category: r.category.clone(),
                sub_category: r.sub_category.clone(),
                sales: r.sales,
            });
        }
        out
    }

    pub fn sales_profit_points(&self) -> Vec<SalesPoint> {
        self.records()
            .iter()
            .map(|r| SalesPoint {
                sales: r.sales,
                profit: r.profit,
                quantity: r.quantity,
            })
            .collect()
    }
}

/// Write a two-column `<key_header>,sales` table.
pub fn write_group_totals<P: AsRef<Path>>(
    path: P,
    key_header: &str,
    totals: &[GroupTotal],
) -> Result<(), ExportError> {
    let path = path.as_ref();
    write_csv_atomic(path, |wtr| {
        wtr.write_record([key_header, "sales"])?;
        for t in totals {
            wtr.write_record([t.key.as_str(), t.sales.to_string().as_str()])?;
        }
        Ok(())
    })?;
    info!(path = %path.display(), rows = totals.len(), "wrote aggregate table");
    Ok(())
}
