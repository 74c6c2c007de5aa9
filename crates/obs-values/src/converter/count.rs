use std::sync::Arc;

use obs_common::{Observation, RawValue};
use tracing::debug;

use super::unless_no_data;
use crate::nodata::NoDataValues;
use crate::output::ValueData;

/// Integer counts.
#[derive(Debug, Clone)]
pub struct CountConverter {
    no_data: Arc<NoDataValues>,
}

impl CountConverter {
    pub fn new(no_data: Arc<NoDataValues>) -> Self {
        Self { no_data }
    }

    pub(crate) fn value(&self, observation: &Observation) -> Option<ValueData> {
        unless_no_data(&self.no_data, observation, || match &observation.value {
            RawValue::Count(v) => Some(ValueData::Count(*v)),
            other => {
                debug!(
                    observation = observation.id,
                    value = ?other,
                    "Non-integer value in count dataset"
                );
                None
            }
        })
    }
}
