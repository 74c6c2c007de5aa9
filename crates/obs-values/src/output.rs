//! Output value types handed to the assembly layer.

use chrono::{DateTime, Utc};
use obs_common::{Geometry, Parameter, TimeInterval};
use rust_decimal::Decimal;
use serde::Serialize;

/// Converted value of one observation.
///
/// An empty value (no timestamp, no value) stands in for a missing
/// observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestart: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// `None` for no-data values.
    pub value: Option<ValueData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_time: Option<TimeInterval>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl OutputValue {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none() && self.value.is_none()
    }
}

/// Typed payload of an output value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValueData {
    Quantity(Decimal),
    Count(i64),
    Text(String),
    Profile(ProfileData),
}

impl ValueData {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ValueData::Quantity(d) => Some(*d),
            ValueData::Count(c) => Some(Decimal::from(*c)),
            _ => None,
        }
    }
}

/// Levels of a vertical profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_unit: Option<String>,
    pub items: Vec<ProfileItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_from: Option<f64>,

    #[serde(rename = "verticalTo")]
    pub vertical: Option<f64>,

    pub value: Option<ValueData>,
}
