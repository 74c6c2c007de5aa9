use std::sync::Arc;

use obs_common::{Observation, RawValue};
use tracing::debug;

use super::unless_no_data;
use crate::nodata::NoDataValues;
use crate::output::ValueData;

/// Free text values, passed through verbatim.
#[derive(Debug, Clone)]
pub struct TextConverter {
    no_data: Arc<NoDataValues>,
}

impl TextConverter {
    pub fn new(no_data: Arc<NoDataValues>) -> Self {
        Self { no_data }
    }

    pub(crate) fn value(&self, observation: &Observation) -> Option<ValueData> {
        unless_no_data(&self.no_data, observation, || match &observation.value {
            RawValue::Text(v) => Some(ValueData::Text(v.clone())),
            other => {
                debug!(
                    observation = observation.id,
                    value = ?other,
                    "Non-text value in text dataset"
                );
                None
            }
        })
    }
}
