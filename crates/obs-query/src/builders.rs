//! Predicate builders, one family per entity dimension.
//!
//! `matches` style builders return `None` for an absent or empty filter
//! set, meaning "no restriction". Identifiers that cannot be parsed turn the
//! whole filter into [`Predicate::Never`] so the enclosing query yields an
//! empty result instead of an error.

use std::collections::BTreeSet;

use obs_common::{Dimension, Envelope, EntityId, ObsError, TimeInterval};
use tracing::debug;

use crate::predicate::{Column, DatasetSubquery, Key, Predicate, ValueSet};

/// Parse surrogate ids for a dimension.
pub fn parse_ids(dimension: &str, ids: &BTreeSet<String>) -> Result<BTreeSet<EntityId>, ObsError> {
    ids.iter()
        .map(|raw| {
            raw.trim()
                .parse::<EntityId>()
                .map_err(|_| ObsError::MalformedIdentifier {
                    dimension: dimension.to_string(),
                    value: raw.clone(),
                })
        })
        .collect()
}

/// Membership predicate on `column_for(key)`, or `None` for an empty set.
fn membership(
    dimension: &str,
    ids: &BTreeSet<String>,
    use_domain_identifiers: bool,
    column_for: impl Fn(Key) -> Column,
) -> Option<Predicate> {
    if ids.is_empty() {
        return None;
    }

    if use_domain_identifiers {
        return Some(Predicate::In {
            column: column_for(Key::Identifier),
            values: ValueSet::Texts(ids.clone()),
        });
    }

    match parse_ids(dimension, ids) {
        Ok(parsed) => Some(Predicate::In {
            column: column_for(Key::Id),
            values: ValueSet::Ids(parsed),
        }),
        Err(e) => {
            debug!(error = %e, "Malformed identifier in filter, matching nothing");
            Some(Predicate::Never)
        }
    }
}

/// Predicates over the entities of one dimension (offerings, phenomena, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityPredicates {
    dimension: Dimension,
}

impl EntityPredicates {
    pub const OFFERINGS: EntityPredicates = EntityPredicates::new(Dimension::Offering);
    pub const PHENOMENA: EntityPredicates = EntityPredicates::new(Dimension::Phenomenon);
    pub const PROCEDURES: EntityPredicates = EntityPredicates::new(Dimension::Procedure);
    pub const FEATURES: EntityPredicates = EntityPredicates::new(Dimension::Feature);
    pub const CATEGORIES: EntityPredicates = EntityPredicates::new(Dimension::Category);
    pub const PLATFORMS: EntityPredicates = EntityPredicates::new(Dimension::Platform);

    pub const fn new(dimension: Dimension) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Restrict entities to the given ids or domain identifiers.
    pub fn matches(&self, ids: &BTreeSet<String>, use_domain_identifiers: bool) -> Option<Predicate> {
        membership(self.dimension.name(), ids, use_domain_identifiers, Column::Own)
    }

    /// Entities referenced by at least one dataset matching `dataset_filter`
    /// (semi-join on this dimension's foreign key).
    pub fn select_from(&self, dataset_filter: Predicate) -> Predicate {
        Predicate::InSubquery {
            column: Column::Own(Key::Id),
            subquery: DatasetSubquery {
                projection: self.dimension,
                filter: Box::new(dataset_filter),
            },
        }
    }
}

/// Predicates over dataset rows.
pub struct DatasetPredicates;

impl DatasetPredicates {
    /// Feature set, published, not deleted and not disabled.
    pub fn is_public() -> Predicate {
        Predicate::and(vec![
            Predicate::IsNotNull(Column::Ref(Dimension::Feature, Key::Id)),
            Predicate::Flag {
                column: Column::Deleted,
                value: false,
            },
            Predicate::Flag {
                column: Column::Disabled,
                value: false,
            },
            Predicate::Flag {
                column: Column::Published,
                value: true,
            },
        ])
    }

    /// Restrict to the given dataset ids or identifiers.
    pub fn matches(ids: &BTreeSet<String>, use_domain_identifiers: bool) -> Option<Predicate> {
        membership("dataset", ids, use_domain_identifiers, Column::Own)
    }

    /// Restrict to datasets referencing one of the given entities.
    pub fn matches_dimension(
        dimension: Dimension,
        ids: &BTreeSet<String>,
        use_domain_identifiers: bool,
    ) -> Option<Predicate> {
        membership(dimension.name(), ids, use_domain_identifiers, |key| {
            Column::Ref(dimension, key)
        })
    }

    pub fn matches_offerings(ids: &BTreeSet<String>, use_domain_identifiers: bool) -> Option<Predicate> {
        Self::matches_dimension(Dimension::Offering, ids, use_domain_identifiers)
    }

    pub fn matches_phenomena(ids: &BTreeSet<String>, use_domain_identifiers: bool) -> Option<Predicate> {
        Self::matches_dimension(Dimension::Phenomenon, ids, use_domain_identifiers)
    }

    pub fn matches_procedures(ids: &BTreeSet<String>, use_domain_identifiers: bool) -> Option<Predicate> {
        Self::matches_dimension(Dimension::Procedure, ids, use_domain_identifiers)
    }

    pub fn matches_features(ids: &BTreeSet<String>, use_domain_identifiers: bool) -> Option<Predicate> {
        Self::matches_dimension(Dimension::Feature, ids, use_domain_identifiers)
    }

    pub fn matches_categories(ids: &BTreeSet<String>, use_domain_identifiers: bool) -> Option<Predicate> {
        Self::matches_dimension(Dimension::Category, ids, use_domain_identifiers)
    }

    pub fn matches_platforms(ids: &BTreeSet<String>, use_domain_identifiers: bool) -> Option<Predicate> {
        Self::matches_dimension(Dimension::Platform, ids, use_domain_identifiers)
    }

    /// Datasets whose feature geometry intersects the envelope.
    pub fn matches_bbox(envelope: Option<&Envelope>) -> Option<Predicate> {
        envelope.map(|envelope| Predicate::Intersects {
            column: Column::Geometry,
            envelope: *envelope,
        })
    }

    pub fn matches_value_types(value_types: &BTreeSet<String>) -> Option<Predicate> {
        text_membership(Column::ValueKind, value_types)
    }

    pub fn matches_dataset_types(dataset_types: &BTreeSet<String>) -> Option<Predicate> {
        text_membership(Column::DatasetKind, dataset_types)
    }
}

fn text_membership(column: Column, values: &BTreeSet<String>) -> Option<Predicate> {
    if values.is_empty() {
        None
    } else {
        Some(Predicate::In {
            column,
            values: ValueSet::Texts(values.clone()),
        })
    }
}

/// Predicates over observation rows.
pub struct ObservationPredicates;

impl ObservationPredicates {
    /// Observations whose sampling end lies within the interval.
    pub fn matches_timespan(timespan: Option<&TimeInterval>) -> Option<Predicate> {
        timespan.map(|interval| Predicate::Within {
            column: Column::SamplingTimeEnd,
            interval: *interval,
        })
    }
}
