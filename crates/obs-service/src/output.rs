//! Output shapes assembled by the service.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use obs_common::{DescribableEntity, Dimension, EntityId, QueryOptions};
use obs_values::OutputValue;
use serde::Serialize;

use crate::aggregation::AggregationResult;

/// Minimal entity representation: id, domain id and localized label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CondensedOutput {
    pub id: String,
    pub domain_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl CondensedOutput {
    pub fn of(entity: &DescribableEntity, dimension: Dimension, options: &QueryOptions) -> Self {
        let id = entity.id.to_string();
        Self {
            href: options.href_for(dimension.collection(), &id),
            id,
            domain_id: entity.identifier.clone(),
            label: entity.label(&options.locale).to_string(),
        }
    }
}

/// Condensed dataset with its type information.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOutput {
    pub id: String,
    pub domain_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub dataset_type: String,
    pub observation_type: String,
    pub value_type: String,
    pub mobile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
}

/// Converted observations of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataOutput {
    pub dataset: EntityId,
    pub value_type: String,
    pub values: Vec<OutputValue>,
}

/// Supplementary dataset payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_times: Option<BTreeSet<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condensed_output_uses_locale_and_href() {
        let entity = DescribableEntity::new(3, "temp")
            .with_name("Temperature")
            .with_translation("de", "Temperatur");
        let options = QueryOptions {
            locale: "de".to_string(),
            href_base: Some("http://localhost/api/".to_string()),
            ..QueryOptions::default()
        };

        let condensed = CondensedOutput::of(&entity, Dimension::Phenomenon, &options);
        assert_eq!(condensed.label, "Temperatur");
        assert_eq!(
            condensed.href.as_deref(),
            Some("http://localhost/api/phenomena/3")
        );

        let json = serde_json::to_value(&condensed).unwrap();
        assert_eq!(json["domainId"], "temp");
    }

    #[test]
    fn test_empty_extras_serialize_to_empty_object() {
        let json = serde_json::to_string(&DatasetExtras::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
