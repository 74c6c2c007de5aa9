//! Conversion of stored observation values into output values.
//!
//! The [`TypeDispatchRegistry`] picks a [`ValueConverter`] from a dataset's
//! (dataset kind, observation kind, value kind) triple. Converters apply the
//! configured [`NoDataValues`], rounding and metadata enrichment.

pub mod converter;
pub mod nodata;
pub mod output;
pub mod registry;

pub use converter::{
    round_quantity, CountConverter, ProfileConverter, QuantityConverter, TextConverter,
    ValueConverter, ValueKind,
};
pub use nodata::{NoDataValues, NO_DATA_TOLERANCE};
pub use output::{OutputValue, ProfileData, ProfileItem, ValueData};
pub use registry::{ConverterDescriptor, TypeDispatchRegistry, TypeKey, DESCRIPTORS};
