//! Common types shared across the observation data-access crates.

pub mod envelope;
pub mod error;
pub mod geometry;
pub mod model;
pub mod options;
pub mod time;

pub use envelope::{Envelope, EnvelopeParseError};
pub use error::{ObsError, ObsResult};
pub use geometry::{Geometry, Point};
pub use model::{
    Dataset, DescribableEntity, Dimension, EntityId, Observation, Parameter, RawValue,
    VerticalSettings,
};
pub use options::QueryOptions;
pub use time::{TimeInterval, TimeParseError};
