//! Facade tying filters, converters, hierarchy and aggregation together.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use obs_common::{Dataset, Dimension, EntityId, ObsError, ObsResult, QueryOptions};
use obs_query::{DatasetPredicates, DbQuery, FilterComposer, Predicate};
use obs_values::TypeDispatchRegistry;
use storage::{DatasetRepository, EntityRepository, ObservationRepository};
use tracing::{debug, info};

use crate::aggregation::AggregationComputer;
use crate::config::DaoConfig;
use crate::hierarchy::HierarchyResolver;
use crate::output::{CondensedOutput, DataOutput, DatasetExtras, DatasetOutput};

/// Read access to datasets, their observations and supplementary payloads.
pub struct ObservationService {
    config: DaoConfig,
    registry: Arc<TypeDispatchRegistry>,
    datasets: Arc<dyn DatasetRepository>,
    entities: Arc<dyn EntityRepository>,
    observations: Arc<dyn ObservationRepository>,
    hierarchy: HierarchyResolver,
    aggregation: AggregationComputer,
}

impl ObservationService {
    /// Service over one store implementing every repository.
    pub fn new<S>(config: DaoConfig, store: Arc<S>) -> Self
    where
        S: DatasetRepository + EntityRepository + ObservationRepository + 'static,
    {
        let registry = Arc::new(TypeDispatchRegistry::new(config.no_data()));
        let entities: Arc<dyn EntityRepository> = store.clone();
        let observations: Arc<dyn ObservationRepository> = store.clone();

        info!(
            known_types = registry.known_types().len(),
            no_data_values = config.no_data_values.len(),
            "Observation service ready"
        );

        Self {
            hierarchy: HierarchyResolver::new(entities.clone(), config.max_hierarchy_depth),
            aggregation: AggregationComputer::new(registry.clone(), observations.clone()),
            config,
            registry,
            datasets: store,
            entities,
            observations,
        }
    }

    pub fn config(&self) -> &DaoConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeDispatchRegistry {
        &self.registry
    }

    /// Parse request parameters, defaulting options from the config.
    pub fn query_from_params(&self, params: &HashMap<String, String>) -> ObsResult<DbQuery> {
        DbQuery::from_params_with(params, self.config.default_options())
    }

    /// Visible datasets matching the query.
    pub fn find_datasets(&self, query: &DbQuery) -> ObsResult<Vec<DatasetOutput>> {
        let datasets = self
            .datasets
            .find_datasets(&FilterComposer::match_filters(query))?;
        debug!(count = datasets.len(), "Found datasets");

        datasets
            .iter()
            .map(|d| self.condense_dataset(d, &query.options))
            .collect()
    }

    /// Converted observations of a dataset within the query timespan,
    /// ordered by sampling end time.
    pub fn get_data(&self, dataset_id: EntityId, query: &DbQuery) -> ObsResult<DataOutput> {
        let dataset = self.visible_dataset(dataset_id)?;
        let converter = self.registry.resolve_for(&dataset)?;

        let mut observations = self
            .observations
            .find_observations(&dataset, &FilterComposer::match_observations(query))?;
        observations.sort_by_key(|o| o.sampling_time_end);

        let values = observations
            .iter()
            .map(|o| converter.convert(Some(o), &dataset, &query.options))
            .collect::<ObsResult<Vec<_>>>()?;

        Ok(DataOutput {
            dataset: dataset.id,
            value_type: dataset.value_kind.clone(),
            values,
        })
    }

    /// Result times and aggregation of a dataset.
    pub fn dataset_extras(&self, dataset_id: EntityId, query: &DbQuery) -> ObsResult<DatasetExtras> {
        let dataset = self.visible_dataset(dataset_id)?;

        let result_times = self.observations.distinct_result_times(&dataset)?;
        let aggregation = self.aggregation.aggregate(&dataset, query)?;

        Ok(DatasetExtras {
            result_times: Some(result_times).filter(|t| !t.is_empty()),
            aggregation: Some(aggregation).filter(|a| !a.is_empty()),
        })
    }

    /// Procedure parents over all visible datasets of a platform.
    pub fn hierarchical_extras(
        &self,
        platform_id: EntityId,
        options: &QueryOptions,
    ) -> ObsResult<BTreeMap<String, BTreeSet<CondensedOutput>>> {
        self.entities.find_entity(Dimension::Platform, platform_id)?;

        let platform = BTreeSet::from([platform_id.to_string()]);
        let filter = Predicate::all_of(vec![
            Some(DatasetPredicates::is_public()),
            DatasetPredicates::matches_platforms(&platform, false),
        ]);
        let datasets = self.datasets.find_datasets(&filter)?;
        self.hierarchy.hierarchical_extras(&datasets, options)
    }

    /// Entities of a dimension reachable from datasets matching the query.
    pub fn reachable(&self, dimension: Dimension, query: &DbQuery) -> ObsResult<Vec<CondensedOutput>> {
        let filter = FilterComposer::match_reachable(dimension, query);
        Ok(self
            .entities
            .find_entities(dimension, &filter)?
            .iter()
            .map(|e| CondensedOutput::of(e, dimension, &query.options))
            .collect())
    }

    pub fn hierarchy(&self) -> &HierarchyResolver {
        &self.hierarchy
    }

    /// Base value kinds with a registered converter.
    pub fn known_types(&self) -> &BTreeSet<String> {
        self.registry.known_types()
    }

    /// Hidden datasets are reported as missing.
    fn visible_dataset(&self, dataset_id: EntityId) -> ObsResult<Dataset> {
        let dataset = self.datasets.find_dataset(dataset_id)?;
        if dataset.is_visible() {
            Ok(dataset)
        } else {
            debug!(dataset = dataset_id, "Dataset is not visible");
            Err(ObsError::NotFound(format!("dataset {}", dataset_id)))
        }
    }

    fn condense_dataset(&self, dataset: &Dataset, options: &QueryOptions) -> ObsResult<DatasetOutput> {
        let label_of = |dimension: Dimension| -> ObsResult<Option<String>> {
            match dataset.reference(dimension) {
                Some(id) => Ok(Some(
                    self.entities
                        .find_entity(dimension, id)?
                        .label(&options.locale)
                        .to_string(),
                )),
                None => Ok(None),
            }
        };

        let phenomenon = label_of(Dimension::Phenomenon)?.unwrap_or_default();
        let procedure = label_of(Dimension::Procedure)?.unwrap_or_default();
        let label = match label_of(Dimension::Feature)? {
            Some(feature) => format!("{} {}, {}", phenomenon, procedure, feature),
            None => format!("{} {}", phenomenon, procedure),
        };

        let id = dataset.id.to_string();
        Ok(DatasetOutput {
            href: options.href_for("datasets", &id),
            id,
            domain_id: dataset.identifier.clone(),
            label,
            dataset_type: dataset.dataset_kind.clone(),
            observation_type: dataset.observation_kind.clone(),
            value_type: dataset.value_kind.clone(),
            mobile: dataset.mobile,
            uom: dataset.unit.clone(),
        })
    }
}
