//! Count and numeric aggregates over a dataset's observations.

use std::sync::Arc;

use obs_common::{Dataset, ObsError, ObsResult};
use obs_query::{DbQuery, FilterComposer};
use obs_values::{round_quantity, TypeDispatchRegistry};
use rust_decimal::Decimal;
use serde::Serialize;
use storage::{NumericAggregate, ObservationRepository};
use tracing::{debug, warn};

/// Aggregates of one dataset. Absent fields were not computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<Decimal>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.count.is_none() && self.min.is_none() && self.max.is_none() && self.avg.is_none()
    }
}

pub struct AggregationComputer {
    registry: Arc<TypeDispatchRegistry>,
    observations: Arc<dyn ObservationRepository>,
}

impl AggregationComputer {
    pub fn new(
        registry: Arc<TypeDispatchRegistry>,
        observations: Arc<dyn ObservationRepository>,
    ) -> Self {
        Self {
            registry,
            observations,
        }
    }

    /// Count, plus min/max/avg for numeric value kinds.
    ///
    /// A dataset whose kinds resolve to no converter yields an empty result.
    /// Storage failures propagate.
    pub fn aggregate(&self, dataset: &Dataset, query: &DbQuery) -> ObsResult<AggregationResult> {
        let converter = match self.registry.resolve_for(dataset) {
            Ok(converter) => converter,
            Err(ObsError::UnknownType(key)) => {
                warn!(dataset = dataset.id, key = %key, "No converter for dataset, skipping aggregation");
                return Ok(AggregationResult::default());
            }
            Err(e) => return Err(e),
        };

        let filter = FilterComposer::match_observations(query);
        let mut result = AggregationResult {
            count: Some(self.observations.count_observations(dataset, &filter)?),
            ..AggregationResult::default()
        };

        if converter.is_numeric() {
            for aggregate in NumericAggregate::ALL {
                let value = self
                    .observations
                    .aggregate_numeric(dataset, &filter, aggregate)?
                    .and_then(|v| round_quantity(v, dataset.number_of_decimals));
                match aggregate {
                    NumericAggregate::Min => result.min = value,
                    NumericAggregate::Max => result.max = value,
                    NumericAggregate::Avg => result.avg = value,
                }
            }
        }

        debug!(dataset = dataset.id, ?result, "Computed aggregation");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obs_common::RawValue;
    use obs_values::NoDataValues;
    use std::str::FromStr;
    use storage::MemoryCatalog;
    use test_utils::{quantity_series, series, DatasetBuilder};

    fn computer(catalog: MemoryCatalog) -> AggregationComputer {
        let registry = Arc::new(TypeDispatchRegistry::new(Arc::new(NoDataValues::default())));
        AggregationComputer::new(registry, Arc::new(catalog))
    }

    #[test]
    fn test_numeric_dataset_gets_all_aggregates() {
        let dataset = DatasetBuilder::new(1).decimals(2).build();
        let computer = computer(
            MemoryCatalog::new().with_observations(quantity_series(1, &[1.0, 2.0, 2.0])),
        );

        let result = computer.aggregate(&dataset, &DbQuery::default()).unwrap();
        assert_eq!(result.count, Some(3));
        assert_eq!(result.min, Some(Decimal::from(1)));
        assert_eq!(result.max, Some(Decimal::from(2)));
        assert_eq!(result.avg, Some(Decimal::from_str("1.67").unwrap()));
    }

    #[test]
    fn test_text_dataset_gets_count_only() {
        let dataset = DatasetBuilder::new(1).value_kind("text").build();
        let computer = computer(MemoryCatalog::new().with_observations(series(
            1,
            [RawValue::Text("a".into()), RawValue::Text("b".into())],
        )));

        let result = computer.aggregate(&dataset, &DbQuery::default()).unwrap();
        assert_eq!(result.count, Some(2));
        assert!(result.min.is_none() && result.max.is_none() && result.avg.is_none());

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"count":2}"#);
    }

    #[test]
    fn test_unknown_type_degrades_to_empty() {
        let dataset = DatasetBuilder::new(1).value_kind("blob").build();
        let computer = computer(MemoryCatalog::new());
        let result = computer.aggregate(&dataset, &DbQuery::default()).unwrap();
        assert!(result.is_empty());
    }
}
