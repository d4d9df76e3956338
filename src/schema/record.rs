use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One fully-populated order line after renaming and cleaning.
///
/// Field order and names are the processed CSV's header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub row_id: i64,
    pub order_id: String,
    pub order_date: NaiveDate,
    pub ship_mode: String,
    pub ship_date: NaiveDate,
    pub customer_id: String,
    pub customer_name: String,
    pub segment: String,
    pub country_region: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub region: String,
    pub product_id: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    pub sales: f64,
    pub quantity: i64,
    pub discount: f64,
    pub profit: f64,
}

impl CanonicalRecord {
    /// Monthly bucket label, e.g. `2023: Jan`.
    pub fn month_year(&self) -> String {
        self.order_date.format("%Y: %b").to_string()
    }

    /// True if any text field is blank or any float is NaN or infinite.
    pub fn has_blank_field(&self) -> bool {
        let texts = [
            &self.order_id,
            &self.ship_mode,
            &self.customer_id,
            &self.customer_name,
            &self.segment,
            &self.country_region,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.region,
            &self.product_id,
            &self.category,
            &self.sub_category,
            &self.product_name,
        ];
        texts.iter().any(|s| s.trim().is_empty())
            || [self.sales, self.discount, self.profit]
                .iter()
                .any(|v| !v.is_finite())
    }

    /// Field-wise identity used for duplicate detection.
    ///
    /// Floats are compared bitwise, so `0.1 + 0.2` and `0.3` are distinct rows.
    pub(crate) fn identity(&self) -> RecordKey {
        RecordKey {
            ints: [self.row_id, self.quantity],
            dates: [self.order_date, self.ship_date],
            floats: [
                self.sales.to_bits(),
                self.discount.to_bits(),
                self.profit.to_bits(),
            ],
            texts: [
                self.order_id.clone(),
                self.ship_mode.clone(),
                self.customer_id.clone(),
                self.customer_name.clone(),
                self.segment.clone(),
                self.country_region.clone(),
                self.city.clone(),
                self.state.clone(),
                self.postal_code.clone(),
                self.region.clone(),
                self.product_id.clone(),
                self.category.clone(),
                self.sub_category.clone(),
                self.product_name.clone(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RecordKey {
    ints: [i64; 2],
    dates: [NaiveDate; 2],
    floats: [u64; 3],
    texts: [String; 14],
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A record with every field populated; tests tweak what they care about.
    pub fn record(
        row_id: i64,
        date: &str,
        region: &str,
        category: &str,
        sales: f64,
    ) -> CanonicalRecord {
        let order_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        CanonicalRecord {
            row_id,
            order_id: format!("CA-2023-{row_id:06}"),
            order_date,
            ship_mode: "Second Class".into(),
            ship_date: order_date + chrono::Duration::days(3),
            customer_id: "CG-12520".into(),
            customer_name: "Claire Gute".into(),
            segment: "Consumer".into(),
            country_region: "United States".into(),
            city: "Henderson".into(),
            state: "Kentucky".into(),
            postal_code: "42420".into(),
            region: region.into(),
            product_id: "FUR-BO-10001798".into(),
            category: category.into(),
            sub_category: "Bookcases".into(),
            product_name: "Bush Somerset Collection Bookcase".into(),
            sales,
            quantity: 2,
            discount: 0.0,
            profit: 41.9136,
        }
    }
}
