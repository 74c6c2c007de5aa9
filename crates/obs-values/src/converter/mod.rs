//! Value converters, one per value kind.
//!
//! All kinds share the same pipeline:
//!
//! ```text
//! observation ─► None? ─────────────► empty OutputValue
//!      │
//!      ├─► timestamp (sampling end, required), timestart (optional)
//!      ├─► expanded?  valid time, result time, parameters, geometry
//!      │   condensed? geometry for mobile platforms only
//!      └─► kind-specific value, `None` when it matches a no-data sentinel
//! ```

mod count;
mod profile;
mod quantity;
mod text;

use std::sync::Arc;

pub use count::CountConverter;
pub use profile::ProfileConverter;
pub use quantity::{round as round_quantity, QuantityConverter};
pub use text::TextConverter;

use obs_common::{Dataset, ObsError, ObsResult, Observation, QueryOptions, TimeInterval};
use serde::{Deserialize, Serialize};

use crate::nodata::NoDataValues;
use crate::output::{OutputValue, ValueData};

/// Primitive type of a measured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Quantity,
    Count,
    Text,
    Profile,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Quantity => "quantity",
            ValueKind::Count => "count",
            ValueKind::Text => "text",
            ValueKind::Profile => "profile",
        }
    }

    /// Kinds that support min/max/avg aggregation.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Quantity | ValueKind::Count)
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converter for one value kind, chosen once at construction.
#[derive(Debug, Clone)]
pub enum ValueConverter {
    Quantity(QuantityConverter),
    Count(CountConverter),
    Text(TextConverter),
    Profile(ProfileConverter),
}

impl ValueConverter {
    pub fn for_kind(kind: ValueKind, no_data: Arc<NoDataValues>) -> Self {
        match kind {
            ValueKind::Quantity => ValueConverter::Quantity(QuantityConverter::new(no_data)),
            ValueKind::Count => ValueConverter::Count(CountConverter::new(no_data)),
            ValueKind::Text => ValueConverter::Text(TextConverter::new(no_data)),
            ValueKind::Profile => ValueConverter::Profile(ProfileConverter::new(no_data)),
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            ValueConverter::Quantity(_) => ValueKind::Quantity,
            ValueConverter::Count(_) => ValueKind::Count,
            ValueConverter::Text(_) => ValueKind::Text,
            ValueConverter::Profile(_) => ValueKind::Profile,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.value_kind().is_numeric()
    }

    /// Convert one observation of `dataset`.
    ///
    /// A missing observation yields an empty value. An observation without a
    /// sampling end time is a storage integrity fault and is reported.
    pub fn convert(
        &self,
        observation: Option<&Observation>,
        dataset: &Dataset,
        options: &QueryOptions,
    ) -> ObsResult<OutputValue> {
        let Some(observation) = observation else {
            return Ok(OutputValue::empty());
        };

        let mut output = timed_output(observation, dataset, options)?;
        output.value = match self {
            ValueConverter::Quantity(c) => c.value(observation, dataset),
            ValueConverter::Count(c) => c.value(observation),
            ValueConverter::Text(c) => c.value(observation),
            ValueConverter::Profile(c) => c.value(observation, dataset, options),
        };
        Ok(output)
    }
}

/// Output carrying timestamps and metadata of an observation, no value yet.
fn timed_output(
    observation: &Observation,
    dataset: &Dataset,
    options: &QueryOptions,
) -> ObsResult<OutputValue> {
    let timestamp = observation
        .sampling_time_end
        .ok_or(ObsError::MissingRequiredTimestamp {
            observation: observation.id,
        })?;

    let mut output = OutputValue {
        timestamp: Some(timestamp),
        ..OutputValue::default()
    };

    if options.show_time_intervals {
        output.timestart = observation.sampling_time_start;
    }

    if options.expanded {
        output.valid_time =
            TimeInterval::from_bounds(observation.valid_time_start, observation.valid_time_end);
        if Dataset::is_distinct_result_time(observation.result_time, observation.sampling_time_end)
        {
            output.result_time = observation.result_time;
        }
        output.parameters = observation.parameters.clone();
        output.geometry = observation.geometry.clone();
    } else if dataset.mobile {
        // stationary platforms share the feature geometry
        output.geometry = observation.geometry.clone();
    }

    Ok(output)
}

/// Apply the no-data check shared by the scalar kinds.
fn unless_no_data(
    no_data: &NoDataValues,
    observation: &Observation,
    value: impl FnOnce() -> Option<ValueData>,
) -> Option<ValueData> {
    if no_data.is_no_data(&observation.value) {
        None
    } else {
        value()
    }
}
