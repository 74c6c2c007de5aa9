//! Entity model: datasets, observations and the describable entities
//! datasets reference.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// Surrogate (storage) identifier.
pub type EntityId = i64;

/// Metadata dimension a dataset refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Offering,
    Phenomenon,
    Procedure,
    Feature,
    Category,
    Platform,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Offering,
        Dimension::Phenomenon,
        Dimension::Procedure,
        Dimension::Feature,
        Dimension::Category,
        Dimension::Platform,
    ];

    /// Collection name used in hrefs, parameter names and extras keys.
    pub fn collection(&self) -> &'static str {
        match self {
            Dimension::Offering => "offerings",
            Dimension::Phenomenon => "phenomena",
            Dimension::Procedure => "procedures",
            Dimension::Feature => "features",
            Dimension::Category => "categories",
            Dimension::Platform => "platforms",
        }
    }

    /// Singular name used in log fields and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Offering => "offering",
            Dimension::Phenomenon => "phenomenon",
            Dimension::Procedure => "procedure",
            Dimension::Feature => "feature",
            Dimension::Category => "category",
            Dimension::Platform => "platform",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Phenomenon, procedure, offering, feature, category or platform.
///
/// `parents` is only populated for procedures; `geometry` only for features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribableEntity {
    pub id: EntityId,

    /// Domain identifier (e.g. a URI or station code).
    pub identifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Locale code -> label.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<EntityId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl DescribableEntity {
    pub fn new(id: EntityId, identifier: impl Into<String>) -> Self {
        Self {
            id,
            identifier: identifier.into(),
            name: None,
            translations: BTreeMap::new(),
            parents: Vec::new(),
            geometry: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_translation(mut self, locale: impl Into<String>, label: impl Into<String>) -> Self {
        self.translations.insert(locale.into(), label.into());
        self
    }

    pub fn with_parents(mut self, parents: Vec<EntityId>) -> Self {
        self.parents = parents;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Label for a locale, falling back to the name and then the identifier.
    pub fn label(&self, locale: &str) -> &str {
        self.translations
            .get(locale)
            .or(self.name.as_ref())
            .map(String::as_str)
            .unwrap_or(&self.identifier)
    }

    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }
}

/// Vertical axis configuration of profile datasets.
///
/// The `*_name` fields name observation parameters that carry the vertical
/// coordinate in legacy encodings where it is not stored on the observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
}

/// A time series of observations bound to its metadata dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: EntityId,

    #[serde(default)]
    pub identifier: String,

    /// "timeseries", "trajectory", "profile", ...
    #[serde(default = "default_dataset_kind")]
    pub dataset_kind: String,

    /// "simple" or a structured kind such as "complex" or "profile".
    #[serde(default = "default_observation_kind")]
    pub observation_kind: String,

    /// "quantity", "count", "text", "profile", ...
    pub value_kind: String,

    pub phenomenon: EntityId,
    pub procedure: EntityId,
    pub offering: EntityId,
    pub category: EntityId,
    pub platform: EntityId,

    /// Missing features make the dataset invisible.
    #[serde(default)]
    pub feature: Option<EntityId>,

    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub disabled: bool,

    /// Whether the platform moves (per-observation geometry).
    #[serde(default)]
    pub mobile: bool,

    #[serde(default)]
    pub insitu: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_value_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_value_at: Option<DateTime<Utc>>,

    /// Rounding precision for quantity values. Negative means unrounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_decimals: Option<i32>,

    /// Distinct result times that differ from the sampling end time.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub result_times: BTreeSet<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalSettings>,
}

impl Dataset {
    /// Visible iff it has a feature, is published, not deleted and not disabled.
    pub fn is_visible(&self) -> bool {
        self.feature.is_some() && self.published && !self.deleted && !self.disabled
    }

    /// The referenced entity id for a dimension.
    pub fn reference(&self, dimension: Dimension) -> Option<EntityId> {
        match dimension {
            Dimension::Offering => Some(self.offering),
            Dimension::Phenomenon => Some(self.phenomenon),
            Dimension::Procedure => Some(self.procedure),
            Dimension::Feature => self.feature,
            Dimension::Category => Some(self.category),
            Dimension::Platform => Some(self.platform),
        }
    }

    /// Whether a result time is worth reporting: set and different from the
    /// sampling end.
    pub fn is_distinct_result_time(
        result_time: Option<DateTime<Utc>>,
        sampling_end: Option<DateTime<Utc>>,
    ) -> bool {
        match (result_time, sampling_end) {
            (Some(result), Some(end)) => result != end,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

fn default_dataset_kind() -> String {
    "timeseries".to_string()
}

fn default_observation_kind() -> String {
    "simple".to_string()
}

/// Free-form observation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: ParameterValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Parameter {
    pub fn numeric(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Number(value),
            unit: None,
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Text(value.into()),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
}

impl ParameterValue {
    /// Numeric view; text values are parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Raw stored value of an observation, typed per value kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RawValue {
    #[default]
    Null,
    Quantity(f64),
    Count(i64),
    Text(String),
    /// Vertical profile: one child observation per level.
    Profile(Vec<Observation>),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Numeric view used for aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Quantity(v) => Some(*v),
            RawValue::Count(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// A single observation of a dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub id: EntityId,

    #[serde(default)]
    pub dataset: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_time_start: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_time_end: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_time_start: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_time_end: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub value: RawValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_from: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_to: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl Observation {
    /// Observation sampled at a single instant.
    pub fn at(id: EntityId, dataset: EntityId, time: DateTime<Utc>, value: RawValue) -> Self {
        Self {
            id,
            dataset,
            sampling_time_start: Some(time),
            sampling_time_end: Some(time),
            value,
            ..Self::default()
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
