//! Configured "no data" sentinels.

use obs_common::RawValue;

/// Absolute tolerance for decimal sentinel matches.
pub const NO_DATA_TOLERANCE: f64 = 1e-4;

/// Sentinel values that stand for a missing measurement.
///
/// Parsed once from the configured strings into decimal, integer and raw
/// string forms. Strings that do not parse as a number are ignored for the
/// numeric forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoDataValues {
    raw: Vec<String>,
    decimals: Vec<f64>,
    integers: Vec<i64>,
}

impl NoDataValues {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = values.into_iter().map(Into::into).collect();
        let decimals = raw
            .iter()
            .filter_map(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .collect();
        let integers = raw
            .iter()
            .filter_map(|s| s.trim().parse::<i64>().ok())
            .collect();

        Self {
            raw,
            decimals,
            integers,
        }
    }

    /// Parse a comma separated sentinel list, e.g. "-9999, 9999.9,n/a".
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    pub fn is_no_data_decimal(&self, value: Option<f64>) -> bool {
        match value {
            None => true,
            Some(v) => self
                .decimals
                .iter()
                .any(|sentinel| (sentinel - v).abs() < NO_DATA_TOLERANCE),
        }
    }

    pub fn is_no_data_integer(&self, value: Option<i64>) -> bool {
        match value {
            None => true,
            Some(v) => self.integers.contains(&v),
        }
    }

    pub fn is_no_data_text(&self, value: Option<&str>) -> bool {
        match value {
            None => true,
            Some(v) => self.raw.iter().any(|sentinel| sentinel == v),
        }
    }

    /// Dispatch on the raw value's kind. Profiles are checked per level.
    pub fn is_no_data(&self, value: &RawValue) -> bool {
        match value {
            RawValue::Null => true,
            RawValue::Quantity(v) => self.is_no_data_decimal(Some(*v)),
            RawValue::Count(v) => self.is_no_data_integer(Some(*v)),
            RawValue::Text(v) => self.is_no_data_text(Some(v)),
            RawValue::Profile(_) => false,
        }
    }
}
