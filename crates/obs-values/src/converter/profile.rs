use std::sync::Arc;

use obs_common::{Dataset, Observation, Parameter, QueryOptions, RawValue};
use tracing::debug;

use super::quantity::round;
use crate::nodata::NoDataValues;
use crate::output::{ProfileData, ProfileItem, ValueData};

/// Vertical profiles: one item per child observation.
///
/// The vertical coordinate is read from the child observation; legacy
/// datasets carry it in a parameter named by the dataset's vertical
/// settings instead.
#[derive(Debug, Clone)]
pub struct ProfileConverter {
    no_data: Arc<NoDataValues>,
}

impl ProfileConverter {
    pub fn new(no_data: Arc<NoDataValues>) -> Self {
        Self { no_data }
    }

    pub(crate) fn value(
        &self,
        observation: &Observation,
        dataset: &Dataset,
        options: &QueryOptions,
    ) -> Option<ValueData> {
        let children = match &observation.value {
            RawValue::Profile(children) => children,
            RawValue::Null => return None,
            other => {
                debug!(
                    observation = observation.id,
                    value = ?other,
                    "Non-profile value in profile dataset"
                );
                return None;
            }
        };

        let settings = dataset.vertical.clone().unwrap_or_default();
        let mut vertical_unit = settings.unit.clone();

        let items = children
            .iter()
            .map(|child| {
                let to_param = settings
                    .to_name
                    .as_deref()
                    .or(settings.parameter_name.as_deref())
                    .and_then(|name| child.parameter(name));
                if vertical_unit.is_none() {
                    vertical_unit = to_param.and_then(|p| p.unit.clone());
                }

                let vertical = child.vertical_to.or_else(|| numeric(to_param));
                let vertical_from = if options.show_vertical_intervals {
                    child.vertical_from.or_else(|| {
                        numeric(
                            settings
                                .from_name
                                .as_deref()
                                .and_then(|name| child.parameter(name)),
                        )
                    })
                } else {
                    None
                };

                ProfileItem {
                    vertical_from,
                    vertical,
                    value: self.level_value(child, dataset),
                }
            })
            .collect();

        Some(ValueData::Profile(ProfileData {
            vertical_unit,
            items,
        }))
    }

    fn level_value(&self, child: &Observation, dataset: &Dataset) -> Option<ValueData> {
        if self.no_data.is_no_data(&child.value) {
            return None;
        }
        match &child.value {
            RawValue::Quantity(v) => round(*v, dataset.number_of_decimals).map(ValueData::Quantity),
            RawValue::Count(v) => Some(ValueData::Count(*v)),
            RawValue::Text(v) => Some(ValueData::Text(v.clone())),
            RawValue::Null | RawValue::Profile(_) => None,
        }
    }
}

fn numeric(parameter: Option<&Parameter>) -> Option<f64> {
    parameter.and_then(|p| p.value.as_f64())
}
