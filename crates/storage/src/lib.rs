//! Storage abstractions for the observation data-access layer.
//!
//! Provides:
//! - Narrow repository traits the core consumes (datasets, entities,
//!   observations)
//! - An in-memory catalog evaluating predicates directly, loadable from YAML

pub mod memory;
pub mod repository;

pub use memory::{DatasetRow, EntityRow, MemoryCatalog, ObservationRow};
pub use repository::{DatasetRepository, EntityRepository, NumericAggregate, ObservationRepository};
