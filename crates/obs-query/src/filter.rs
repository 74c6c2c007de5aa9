//! Request filters and their composition into dataset predicates.

use std::collections::{BTreeSet, HashMap};

use obs_common::{Dimension, Envelope, ObsError, ObsResult, QueryOptions, TimeInterval};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builders::{DatasetPredicates, EntityPredicates, ObservationPredicates};
use crate::predicate::Predicate;

/// Filter parameters of a dataset query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbQuery {
    #[serde(default)]
    pub offerings: BTreeSet<String>,
    #[serde(default)]
    pub features: BTreeSet<String>,
    #[serde(default)]
    pub phenomena: BTreeSet<String>,
    #[serde(default)]
    pub procedures: BTreeSet<String>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub platforms: BTreeSet<String>,
    #[serde(default)]
    pub datasets: BTreeSet<String>,
    #[serde(default)]
    pub value_types: BTreeSet<String>,
    #[serde(default)]
    pub dataset_types: BTreeSet<String>,
    #[serde(default)]
    pub bbox: Option<Envelope>,
    #[serde(default)]
    pub timespan: Option<TimeInterval>,
    #[serde(default)]
    pub options: QueryOptions,
}

impl DbQuery {
    /// Parse request parameters. Unknown keys are ignored.
    ///
    /// List parameters are comma separated; `bbox` is "minx,miny,maxx,maxy";
    /// `timespan` is "start/end" or a single instant.
    pub fn from_params(params: &HashMap<String, String>) -> ObsResult<Self> {
        Self::from_params_with(params, QueryOptions::default())
    }

    /// Like [`DbQuery::from_params`], starting from `defaults` for options
    /// the request does not set.
    pub fn from_params_with(
        params: &HashMap<String, String>,
        defaults: QueryOptions,
    ) -> ObsResult<Self> {
        let mut query = DbQuery {
            options: defaults,
            ..DbQuery::default()
        };

        for (key, value) in params {
            match key.as_str() {
                "offerings" => query.offerings = split_list(value),
                "features" => query.features = split_list(value),
                "phenomena" => query.phenomena = split_list(value),
                "procedures" => query.procedures = split_list(value),
                "categories" => query.categories = split_list(value),
                "platforms" => query.platforms = split_list(value),
                "datasets" => query.datasets = split_list(value),
                "valueTypes" => query.value_types = split_list(value),
                "datasetTypes" => query.dataset_types = split_list(value),
                "bbox" => query.bbox = Some(Envelope::from_bbox_string(value)?),
                "timespan" => query.timespan = Some(TimeInterval::parse(value)?),
                "expanded" => query.options.expanded = parse_bool(key, value)?,
                "showTimeIntervals" => query.options.show_time_intervals = parse_bool(key, value)?,
                "showVerticalIntervals" => {
                    query.options.show_vertical_intervals = parse_bool(key, value)?
                }
                "matchDomainIds" => query.options.use_domain_identifiers = parse_bool(key, value)?,
                "locale" => query.options.locale = value.trim().to_string(),
                "hrefBase" => query.options.href_base = Some(value.trim().to_string()),
                _ => debug!(param = %key, "Ignoring unknown query parameter"),
            }
        }

        Ok(query)
    }

    /// Filter ids requested for a dimension.
    pub fn ids_for(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Offering => &self.offerings,
            Dimension::Phenomenon => &self.phenomena,
            Dimension::Procedure => &self.procedures,
            Dimension::Feature => &self.features,
            Dimension::Category => &self.categories,
            Dimension::Platform => &self.platforms,
        }
    }

    pub fn match_domain_ids(&self) -> bool {
        self.options.use_domain_identifiers
    }

    /// Copy of this query with one dimension filter replaced.
    pub fn with_ids(mut self, dimension: Dimension, ids: BTreeSet<String>) -> Self {
        match dimension {
            Dimension::Offering => self.offerings = ids,
            Dimension::Phenomenon => self.phenomena = ids,
            Dimension::Procedure => self.procedures = ids,
            Dimension::Feature => self.features = ids,
            Dimension::Category => self.categories = ids,
            Dimension::Platform => self.platforms = ids,
        }
        self
    }
}

fn split_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(param: &str, value: &str) -> ObsResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ObsError::InvalidParameter {
            param: param.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

/// Combines dimension predicates into the predicate of a dataset query.
pub struct FilterComposer;

impl FilterComposer {
    /// `is_public()` AND every requested dimension, bbox and type filter.
    ///
    /// Absent filters are omitted, so an empty query is equivalent to
    /// `is_public()` alone.
    pub fn match_filters(query: &DbQuery) -> Predicate {
        let domain_ids = query.match_domain_ids();
        let predicate = Predicate::all_of(vec![
            Some(DatasetPredicates::is_public()),
            DatasetPredicates::matches(&query.datasets, domain_ids),
            DatasetPredicates::matches_offerings(&query.offerings, domain_ids),
            DatasetPredicates::matches_features(&query.features, domain_ids),
            DatasetPredicates::matches_phenomena(&query.phenomena, domain_ids),
            DatasetPredicates::matches_procedures(&query.procedures, domain_ids),
            DatasetPredicates::matches_categories(&query.categories, domain_ids),
            DatasetPredicates::matches_platforms(&query.platforms, domain_ids),
            DatasetPredicates::matches_bbox(query.bbox.as_ref()),
            DatasetPredicates::matches_value_types(&query.value_types),
            DatasetPredicates::matches_dataset_types(&query.dataset_types),
        ]);

        debug!(predicate = %predicate, "Composed dataset filter");
        predicate
    }

    /// Entities of `dimension` reachable from any dataset matching the query.
    ///
    /// The dimension's own filter still applies on the entity itself; the
    /// remaining filters restrict the datasets of the semi-join.
    pub fn match_reachable(dimension: Dimension, query: &DbQuery) -> Predicate {
        let builder = EntityPredicates::new(dimension);
        let own = builder.matches(query.ids_for(dimension), query.match_domain_ids());
        let datasets = FilterComposer::match_filters(
            &query.clone().with_ids(dimension, BTreeSet::new()),
        );
        Predicate::all_of(vec![own, Some(builder.select_from(datasets))])
    }

    /// Observation predicate for the query (timespan).
    pub fn match_observations(query: &DbQuery) -> Predicate {
        Predicate::all_of(vec![ObservationPredicates::matches_timespan(
            query.timespan.as_ref(),
        )])
    }
}
