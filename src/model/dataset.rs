use chrono::NaiveDate;
use std::collections::HashSet;

use crate::error::EmptyDatasetError;
use crate::schema::CanonicalRecord;

/// Date range and inclusion sets a row must satisfy to survive filtering.
///
/// An empty inclusion set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub regions: HashSet<String>,
    pub states: HashSet<String>,
    pub cities: HashSet<String>,
}

impl FilterCriteria {
    pub fn new<R, S, C>(start: NaiveDate, end: NaiveDate, regions: R, states: S, cities: C) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            start,
            end,
            regions: regions.into_iter().map(Into::into).collect(),
            states: states.into_iter().map(Into::into).collect(),
            cities: cities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, r: &CanonicalRecord) -> bool {
        r.order_date >= self.start
            && r.order_date <= self.end
            && self.regions.contains(&r.region)
            && self.states.contains(&r.state)
            && self.cities.contains(&r.city)
    }
}

/// Ordered, immutable collection of canonical records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<CanonicalRecord>,
}

impl From<Vec<CanonicalRecord>> for Dataset {
    fn from(records: Vec<CanonicalRecord>) -> Self {
        Self { records }
    }
}

impl Dataset {
    pub fn new(records: Vec<CanonicalRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows satisfying every predicate of `criteria`, in dataset order.
    pub fn filter(&self, criteria: &FilterCriteria) -> Dataset {
        self.records
            .iter()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect::<Vec<_>>()
            .into()
    }

    pub fn min_order_date(&self) -> Result<NaiveDate, EmptyDatasetError> {
        self.records
            .iter()
            .map(|r| r.order_date)
            .min()
            .ok_or(EmptyDatasetError)
    }

    pub fn max_order_date(&self) -> Result<NaiveDate, EmptyDatasetError> {
        self.records
            .iter()
            .map(|r| r.order_date)
            .max()
            .ok_or(EmptyDatasetError)
    }

    /// Distinct states of rows whose region is in `regions`.
    pub fn states_in_regions<S: AsRef<str>>(&self, regions: &[S]) -> Vec<String> {
        let wanted: HashSet<&str> = regions.iter().map(AsRef::as_ref).collect();
        distinct(
            self.records
                .iter()
                .filter(|r| wanted.contains(r.region.as_str()))
                .map(|r| r.state.as_str()),
        )
    }

    /// Distinct cities of rows whose state is in `states`.
    pub fn cities_in_states<S: AsRef<str>>(&self, states: &[S]) -> Vec<String> {
        let wanted: HashSet<&str> = states.iter().map(AsRef::as_ref).collect();
        distinct(
            self.records
                .iter()
                .filter(|r| wanted.contains(r.state.as_str()))
                .map(|r| r.city.as_str()),
        )
    }

    pub fn unique_regions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    pub fn unique_states(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.state.as_str()))
    }

    pub fn unique_cities(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.city.as_str()))
    }
}

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
