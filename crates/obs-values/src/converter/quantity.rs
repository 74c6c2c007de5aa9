use std::str::FromStr;
use std::sync::Arc;

use obs_common::{Dataset, Observation, RawValue};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use super::unless_no_data;
use crate::nodata::NoDataValues;
use crate::output::ValueData;

/// Decimal quantities, rounded to the dataset's number of decimals.
#[derive(Debug, Clone)]
pub struct QuantityConverter {
    no_data: Arc<NoDataValues>,
}

impl QuantityConverter {
    pub fn new(no_data: Arc<NoDataValues>) -> Self {
        Self { no_data }
    }

    pub(crate) fn value(&self, observation: &Observation, dataset: &Dataset) -> Option<ValueData> {
        unless_no_data(&self.no_data, observation, || match &observation.value {
            RawValue::Quantity(v) => round(*v, dataset.number_of_decimals).map(ValueData::Quantity),
            RawValue::Count(v) => Some(ValueData::Quantity(Decimal::from(*v))),
            other => {
                debug!(
                    observation = observation.id,
                    value = ?other,
                    "Non-numeric value in quantity dataset"
                );
                None
            }
        })
    }
}

const MAX_SCALE: u32 = 28;

/// Round half away from zero on the shortest decimal representation of
/// `value`, so 9.995 becomes 10.00 with two decimals.
///
/// `None` or a negative precision keeps the value unrounded. Non-finite
/// values and magnitudes beyond the decimal range (about 7.9e28) have no
/// decimal form and yield `None`; the latter are logged.
pub fn round(value: f64, decimals: Option<i32>) -> Option<Decimal> {
    let exact = Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value));
    let Some(exact) = exact else {
        if value.is_finite() {
            warn!(value, "Quantity exceeds the decimal range, reporting no value");
        }
        return None;
    };

    match decimals {
        Some(dp) if dp >= 0 => {
            let dp = (dp as u32).min(MAX_SCALE);
            let mut rounded =
                exact.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
            // pad to the requested scale, 8.5 -> 8.50
            rounded.rescale(dp);
            Some(rounded)
        }
        _ => Some(exact),
    }
}
