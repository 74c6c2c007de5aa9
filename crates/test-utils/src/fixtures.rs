//! Common test fixtures for observation data-access tests.
//!
//! This module provides builders and pre-defined values for the datasets,
//! entities and observations most tests need.

use std::collections::BTreeSet;
use std::io::Write;

use chrono::{DateTime, Duration, Utc};
use obs_common::{Dataset, DescribableEntity, EntityId, Observation, RawValue};
use tempfile::NamedTempFile;

/// Common bounding boxes as `minx,miny,maxx,maxy` strings.
pub mod bbox {
    /// Whole world
    pub const GLOBAL: &str = "-180,-90,180,90";

    /// North Rhine-Westphalia, contains both sample stations
    pub const NRW: &str = "5.8,50.3,9.5,52.6";

    /// Around the Muenster station only
    pub const MUENSTER: &str = "7.5,51.8,7.7,52.0";

    /// Somewhere in the Pacific, contains no station
    pub const PACIFIC: &str = "160,-50,170,-40";
}

/// Common time values for testing.
pub mod time {
    use chrono::{DateTime, Utc};

    /// A fixed reference time for tests (2024-01-15T12:00:00Z)
    pub const REFERENCE_TIME: &str = "2024-01-15T12:00:00Z";

    /// Timespan covering the first two sample observations
    pub const FIRST_TWO_HOURS: &str = "2024-01-15T12:00:00Z/2024-01-15T13:00:00Z";

    pub fn reference_time() -> DateTime<Utc> {
        REFERENCE_TIME
            .parse()
            .unwrap_or_else(|e| panic!("invalid reference time: {}", e))
    }
}

/// Builder for [`Dataset`] values with visible defaults.
///
/// The default dataset is a published quantity time series referencing
/// entity 1 in every dimension.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    dataset: Dataset,
}

impl DatasetBuilder {
    pub fn new(id: EntityId) -> Self {
        Self {
            dataset: Dataset {
                id,
                identifier: format!("dataset-{}", id),
                dataset_kind: "timeseries".to_string(),
                observation_kind: "simple".to_string(),
                value_kind: "quantity".to_string(),
                phenomenon: 1,
                procedure: 1,
                offering: 1,
                category: 1,
                platform: 1,
                feature: Some(1),
                published: true,
                deleted: false,
                disabled: false,
                mobile: false,
                insitu: true,
                first_value_at: None,
                last_value_at: None,
                number_of_decimals: None,
                result_times: BTreeSet::new(),
                unit: None,
                vertical: None,
            },
        }
    }

    pub fn kinds(mut self, dataset_kind: &str, observation_kind: &str, value_kind: &str) -> Self {
        self.dataset.dataset_kind = dataset_kind.to_string();
        self.dataset.observation_kind = observation_kind.to_string();
        self.dataset.value_kind = value_kind.to_string();
        self
    }

    pub fn value_kind(mut self, value_kind: &str) -> Self {
        self.dataset.value_kind = value_kind.to_string();
        self
    }

    pub fn decimals(mut self, decimals: i32) -> Self {
        self.dataset.number_of_decimals = Some(decimals);
        self
    }

    pub fn phenomenon(mut self, id: EntityId) -> Self {
        self.dataset.phenomenon = id;
        self
    }

    pub fn procedure(mut self, id: EntityId) -> Self {
        self.dataset.procedure = id;
        self
    }

    pub fn offering(mut self, id: EntityId) -> Self {
        self.dataset.offering = id;
        self
    }

    pub fn platform(mut self, id: EntityId) -> Self {
        self.dataset.platform = id;
        self
    }

    pub fn feature(mut self, id: Option<EntityId>) -> Self {
        self.dataset.feature = id;
        self
    }

    pub fn mobile(mut self) -> Self {
        self.dataset.mobile = true;
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.dataset.published = false;
        self
    }

    pub fn build(self) -> Dataset {
        self.dataset
    }
}

/// Entity with a name, as found in most dimension tables.
pub fn entity(id: EntityId, identifier: &str, name: &str) -> DescribableEntity {
    DescribableEntity::new(id, identifier).with_name(name)
}

/// Hourly quantity observations starting at the reference time.
pub fn quantity_series(dataset: EntityId, values: &[f64]) -> Vec<Observation> {
    series(dataset, values.iter().map(|v| RawValue::Quantity(*v)))
}

/// Hourly observations of arbitrary raw values starting at the reference time.
pub fn series(dataset: EntityId, values: impl IntoIterator<Item = RawValue>) -> Vec<Observation> {
    let start = time::reference_time();
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let id = dataset * 1000 + i as EntityId;
            Observation::at(id, dataset, at_hour(start, i as i64), value)
        })
        .collect()
}

fn at_hour(start: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    start + Duration::hours(hours)
}

/// Write `contents` to a temporary `.yaml` file that lives as long as the
/// returned handle.
pub fn temp_yaml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap_or_else(|e| panic!("failed to create temp file: {}", e));
    file.write_all(contents.as_bytes())
        .unwrap_or_else(|e| panic!("failed to write temp file: {}", e));
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dataset_is_visible() {
        assert!(DatasetBuilder::new(1).build().is_visible());
        assert!(!DatasetBuilder::new(1).unpublished().build().is_visible());
        assert!(!DatasetBuilder::new(1).feature(None).build().is_visible());
    }

    #[test]
    fn test_series_is_hourly() {
        let obs = quantity_series(2, &[1.0, 2.0, 3.0]);
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].id, 2000);
        assert_eq!(
            obs[2].sampling_time_end.unwrap() - obs[0].sampling_time_end.unwrap(),
            Duration::hours(2)
        );
    }

    #[test]
    fn test_temp_yaml_file() {
        let file = temp_yaml_file("a: 1\n");
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "a: 1\n");
    }
}
