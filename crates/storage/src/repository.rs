//! Repository traits.
//!
//! Calls are synchronous and may block; implementations own connection
//! handling, timeouts and retries.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use obs_common::{Dataset, DescribableEntity, Dimension, EntityId, ObsResult, Observation};
use obs_query::Predicate;

/// Datasets filtered by dataset predicates.
pub trait DatasetRepository: Send + Sync {
    /// Dataset by surrogate id, `NotFound` if absent.
    fn find_dataset(&self, id: EntityId) -> ObsResult<Dataset>;

    fn find_datasets(&self, filter: &Predicate) -> ObsResult<Vec<Dataset>>;

    fn datasets_exist(&self, filter: &Predicate) -> ObsResult<bool> {
        Ok(!self.find_datasets(filter)?.is_empty())
    }
}

/// Describable entities of every dimension.
pub trait EntityRepository: Send + Sync {
    /// Entity by surrogate id, `NotFound` if absent.
    fn find_entity(&self, dimension: Dimension, id: EntityId) -> ObsResult<DescribableEntity>;

    fn find_entities(
        &self,
        dimension: Dimension,
        filter: &Predicate,
    ) -> ObsResult<Vec<DescribableEntity>>;
}

/// Numeric aggregate over observation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericAggregate {
    Min,
    Max,
    Avg,
}

impl NumericAggregate {
    pub const ALL: [NumericAggregate; 3] = [
        NumericAggregate::Min,
        NumericAggregate::Max,
        NumericAggregate::Avg,
    ];
}

/// Observations of one dataset, filtered by observation predicates.
pub trait ObservationRepository: Send + Sync {
    /// Matching observations in storage order.
    fn find_observations(&self, dataset: &Dataset, filter: &Predicate)
        -> ObsResult<Vec<Observation>>;

    fn count_observations(&self, dataset: &Dataset, filter: &Predicate) -> ObsResult<u64>;

    /// Aggregate over numeric values; `None` when no numeric value matches.
    fn aggregate_numeric(
        &self,
        dataset: &Dataset,
        filter: &Predicate,
        aggregate: NumericAggregate,
    ) -> ObsResult<Option<f64>>;

    /// Result times that differ from the sampling end, deduplicated by value.
    fn distinct_result_times(&self, dataset: &Dataset) -> ObsResult<BTreeSet<DateTime<Utc>>>;
}
