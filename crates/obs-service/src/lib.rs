//! Observation data-access service.
//!
//! Combines the filter composition of `obs-query`, the converters of
//! `obs-values` and the repositories of `storage` into dataset queries,
//! data conversion, hierarchical extras and aggregation.

pub mod aggregation;
pub mod config;
pub mod hierarchy;
pub mod output;
pub mod service;

pub use aggregation::{AggregationComputer, AggregationResult};
pub use config::DaoConfig;
pub use hierarchy::HierarchyResolver;
pub use output::{CondensedOutput, DataOutput, DatasetExtras, DatasetOutput};
pub use service::ObservationService;
