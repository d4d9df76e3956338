//! In-memory query model over the processed dataset.
//!
//! A [`DatasetModel`] belongs to one client session. It keeps the dataset as
//! loaded plus a current view; `filter_data` narrows the current view, so
//! successive calls compose. [`Dataset::filter`] is the pure operation
//! underneath.

pub mod aggregate;
pub mod dataset;
pub mod load;

use chrono::NaiveDate;
use std::path::Path;

use crate::error::{DataLoadError, EmptyDatasetError};

pub use aggregate::{write_group_totals, GroupTotal, HierarchyRow, SalesPoint};
pub use dataset::{Dataset, FilterCriteria};
pub use load::{read_processed_csv, LoadReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loaded,
    /// Number of filters applied since the last load or reset.
    Filtered(usize),
}

#[derive(Debug, Clone, Default)]
pub struct DatasetModel {
    loaded: Option<Dataset>,
    view: Dataset,
    filters_applied: usize,
}

impl DatasetModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model already holding `dataset`, in the `Loaded` state.
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            view: dataset.clone(),
            loaded: Some(dataset),
            filters_applied: 0,
        }
    }

    pub fn state(&self) -> ModelState {
        match (&self.loaded, self.filters_applied) {
            (None, _) => ModelState::Unloaded,
            (Some(_), 0) => ModelState::Loaded,
            (Some(_), n) => ModelState::Filtered(n),
        }
    }

    /// Replace the dataset with the processed CSV at `path`.
    ///
    /// On error the model keeps whatever it held before.
    pub fn load_data<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport, DataLoadError> {
        let (dataset, report) = read_processed_csv(path)?;
        *self = Self::from_dataset(dataset);
        Ok(report)
    }

    /// Narrow the current view to rows dated within `[start, end]` whose
    /// region, state and city are all selected. Empty selections keep nothing.
    pub fn filter_data<S: AsRef<str>>(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        regions: &[S],
        states: &[S],
        cities: &[S],
    ) {
        let criteria = FilterCriteria::new(
            start,
            end,
            regions.iter().map(|s| s.as_ref().to_string()),
            states.iter().map(|s| s.as_ref().to_string()),
            cities.iter().map(|s| s.as_ref().to_string()),
        );
        self.apply(&criteria);
    }

    /// Narrow the current view with prepared criteria.
    pub fn apply(&mut self, criteria: &FilterCriteria) {
        self.view = self.view.filter(criteria);
        if self.loaded.is_some() {
            self.filters_applied += 1;
        }
    }

    /// Go back to the dataset as loaded.
    pub fn reset_filters(&mut self) {
        if let Some(loaded) = &self.loaded {
            self.view = loaded.clone();
        }
        self.filters_applied = 0;
    }

    /// The current view.
    pub fn dataset(&self) -> &Dataset {
        &self.view
    }

    pub fn filter_states_based_on_regions<S: AsRef<str>>(&self, regions: &[S]) -> Vec<String> {
        self.view.states_in_regions(regions)
    }

    pub fn filter_cities_based_on_states<S: AsRef<str>>(&self, states: &[S]) -> Vec<String> {
        self.view.cities_in_states(states)
    }

    pub fn unique_regions(&self) -> Vec<String> {
        self.view.unique_regions()
    }

    pub fn unique_states(&self) -> Vec<String> {
        self.view.unique_states()
    }

    pub fn unique_cities(&self) -> Vec<String> {
        self.view.unique_cities()
    }

    pub fn min_order_date(&self) -> Result<NaiveDate, EmptyDatasetError> {
        self.view.min_order_date()
    }

    pub fn max_order_date(&self) -> Result<NaiveDate, EmptyDatasetError> {
        self.view.max_order_date()
    }

    pub fn category_data(&self) -> Vec<GroupTotal> {
        self.view.category_data()
    }

    pub fn region_data(&self) -> Vec<GroupTotal> {
        self.view.region_data()
    }

    pub fn segment_data(&self) -> Vec<GroupTotal> {
        self.view.segment_data()
    }

    pub fn time_series_data(&self) -> Vec<GroupTotal> {
        self.view.time_series_data()
    }

    pub fn hierarchy_data(&self) -> Vec<HierarchyRow> {
        self.view.hierarchy_data()
    }

    pub fn sales_profit_points(&self) -> Vec<SalesPoint> {
        self.view.sales_profit_points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::export_csv;
    use crate::schema::record::fixtures::record;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Dataset {
        let mut west = record(3, "2023-03-01", "West", "Technology", 100.0);
        west.state = "California".into();
        west.city = "Los Angeles".into();
        Dataset::new(vec![
            record(1, "2023-01-05", "South", "Furniture", 10.0),
            record(2, "2023-02-01", "South", "Office Supplies", 5.0),
            west,
        ])
    }

    #[test]
    fn state_machine_and_composed_filters() {
        let mut model = DatasetModel::new();
        assert_eq!(model.state(), ModelState::Unloaded);
        assert_eq!(model.min_order_date(), Err(EmptyDatasetError));
        assert!(model.category_data().is_empty());

        model = DatasetModel::from_dataset(sample());
        assert_eq!(model.state(), ModelState::Loaded);

        let regions = model.unique_regions();
        let states = model.filter_states_based_on_regions(&regions);
        let cities = model.filter_cities_based_on_states(&states);
        model.filter_data(date("2023-01-01"), date("2023-12-31"), &regions, &states, &cities);
        assert_eq!(model.state(), ModelState::Filtered(1));
        assert_eq!(model.dataset().len(), 3);

        model.filter_data(date("2023-02-01"), date("2023-12-31"), &regions, &states, &cities);
        assert_eq!(model.dataset().len(), 2);

        // A wider range cannot bring back rows already filtered out.
        model.filter_data(date("2000-01-01"), date("2100-01-01"), &regions, &states, &cities);
        assert_eq!(model.state(), ModelState::Filtered(3));
        assert_eq!(model.dataset().len(), 2);
        assert_eq!(model.min_order_date(), Ok(date("2023-02-01")));

        model.reset_filters();
        assert_eq!(model.state(), ModelState::Loaded);
        assert_eq!(model.dataset().len(), 3);
    }

    #[test]
    fn filtering_to_nothing_makes_extrema_fail() {
        let mut model = DatasetModel::from_dataset(sample());
        let regions = model.unique_regions();
        let states = model.unique_states();
        model.filter_data::<String>(date("2023-01-01"), date("2023-12-31"), &regions, &states, &[]);

        assert!(model.dataset().is_empty());
        assert_eq!(model.min_order_date(), Err(EmptyDatasetError));
        assert_eq!(model.max_order_date(), Err(EmptyDatasetError));
        assert!(model.time_series_data().is_empty());
        assert!(model.filter_states_based_on_regions(&regions).is_empty());
    }

    #[test]
    fn cascading_queries_do_not_mutate() {
        let model = DatasetModel::from_dataset(sample());
        assert_eq!(model.filter_states_based_on_regions(&["West"]), vec!["California"]);
        assert_eq!(model.filter_cities_based_on_states(&["Kentucky"]), vec!["Henderson"]);
        assert_eq!(model.dataset().len(), 3);
        assert_eq!(model.state(), ModelState::Loaded);
    }

    #[test]
    fn failed_load_keeps_previous_snapshot() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("Superstore.csv");
        export_csv(sample().records(), &good).unwrap();

        let mut model = DatasetModel::new();
        let report = model.load_data(&good).unwrap();
        assert_eq!(report.loaded, 3);
        assert_eq!(model.state(), ModelState::Loaded);

        let err = model.load_data(dir.path().join("Superstore.parquet")).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedExtension { .. }));
        assert_eq!(model.state(), ModelState::Loaded);
        assert_eq!(model.dataset().len(), 3);
        assert_eq!(
            model.category_data(),
            vec![
                GroupTotal {
                    key: "Furniture".into(),
                    sales: 10.0
                },
                GroupTotal {
                    key: "Office Supplies".into(),
                    sales: 5.0
                },
                GroupTotal {
                    key: "Technology".into(),
                    sales: 100.0
                },
            ]
        );
    }
}
