//! In-memory catalog.
//!
//! Holds entities, datasets and observations in plain vectors and answers
//! repository calls by evaluating predicates against row views. Used by
//! tests and the command line tool.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use obs_common::{
    Dataset, DescribableEntity, Dimension, EntityId, ObsError, ObsResult, Observation,
};
use obs_query::{Cell, Column, DatasetSubquery, Key, Predicate, Row, SubqueryResolver};
use serde::Deserialize;
use tracing::{debug, info};

use crate::repository::{
    DatasetRepository, EntityRepository, NumericAggregate, ObservationRepository,
};

/// Catalog contents, one vector per table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemoryCatalog {
    offerings: Vec<DescribableEntity>,
    phenomena: Vec<DescribableEntity>,
    procedures: Vec<DescribableEntity>,
    features: Vec<DescribableEntity>,
    categories: Vec<DescribableEntity>,
    platforms: Vec<DescribableEntity>,
    datasets: Vec<Dataset>,
    observations: Vec<Observation>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(yaml: &str) -> ObsResult<Self> {
        let catalog: MemoryCatalog = serde_yaml::from_str(yaml)
            .map_err(|e| ObsError::Storage(format!("Invalid catalog: {}", e)))?;
        debug!(
            datasets = catalog.datasets.len(),
            observations = catalog.observations.len(),
            "Parsed catalog"
        );
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> ObsResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ObsError::Storage(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn with_entity(mut self, dimension: Dimension, entity: DescribableEntity) -> Self {
        self.table_mut(dimension).push(entity);
        self
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn with_observations(mut self, observations: impl IntoIterator<Item = Observation>) -> Self {
        self.observations.extend(observations);
        self
    }

    pub fn entities(&self, dimension: Dimension) -> &[DescribableEntity] {
        match dimension {
            Dimension::Offering => &self.offerings,
            Dimension::Phenomenon => &self.phenomena,
            Dimension::Procedure => &self.procedures,
            Dimension::Feature => &self.features,
            Dimension::Category => &self.categories,
            Dimension::Platform => &self.platforms,
        }
    }

    fn table_mut(&mut self, dimension: Dimension) -> &mut Vec<DescribableEntity> {
        match dimension {
            Dimension::Offering => &mut self.offerings,
            Dimension::Phenomenon => &mut self.phenomena,
            Dimension::Procedure => &mut self.procedures,
            Dimension::Feature => &mut self.features,
            Dimension::Category => &mut self.categories,
            Dimension::Platform => &mut self.platforms,
        }
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    fn entity(&self, dimension: Dimension, id: EntityId) -> Option<&DescribableEntity> {
        self.entities(dimension).iter().find(|e| e.id == id)
    }

    fn dataset_row<'a>(&'a self, dataset: &'a Dataset) -> DatasetRow<'a> {
        DatasetRow {
            dataset,
            catalog: self,
        }
    }

    fn matching_observations<'a>(
        &'a self,
        dataset: &'a Dataset,
        filter: &'a Predicate,
    ) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations
            .iter()
            .filter(move |o| o.dataset == dataset.id)
            .filter(move |o| filter.evaluate(&ObservationRow(o), self))
    }
}

impl SubqueryResolver for MemoryCatalog {
    fn project(&self, subquery: &DatasetSubquery) -> BTreeSet<EntityId> {
        let filter = subquery.filter.bind_subqueries(self);
        self.datasets
            .iter()
            .filter(|d| filter.evaluate(&self.dataset_row(d), self))
            .filter_map(|d| d.reference(subquery.projection))
            .collect()
    }
}

impl DatasetRepository for MemoryCatalog {
    fn find_dataset(&self, id: EntityId) -> ObsResult<Dataset> {
        self.datasets
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ObsError::NotFound(format!("dataset {}", id)))
    }

    fn find_datasets(&self, filter: &Predicate) -> ObsResult<Vec<Dataset>> {
        let filter = filter.bind_subqueries(self);
        Ok(self
            .datasets
            .iter()
            .filter(|d| filter.evaluate(&self.dataset_row(d), self))
            .cloned()
            .collect())
    }
}

impl EntityRepository for MemoryCatalog {
    fn find_entity(&self, dimension: Dimension, id: EntityId) -> ObsResult<DescribableEntity> {
        self.entity(dimension, id)
            .cloned()
            .ok_or_else(|| ObsError::NotFound(format!("{} {}", dimension, id)))
    }

    fn find_entities(
        &self,
        dimension: Dimension,
        filter: &Predicate,
    ) -> ObsResult<Vec<DescribableEntity>> {
        let filter = filter.bind_subqueries(self);
        Ok(self
            .entities(dimension)
            .iter()
            .filter(|e| filter.evaluate(&EntityRow(e), self))
            .cloned()
            .collect())
    }
}

impl ObservationRepository for MemoryCatalog {
    fn find_observations(
        &self,
        dataset: &Dataset,
        filter: &Predicate,
    ) -> ObsResult<Vec<Observation>> {
        Ok(self
            .matching_observations(dataset, filter)
            .cloned()
            .collect())
    }

    fn count_observations(&self, dataset: &Dataset, filter: &Predicate) -> ObsResult<u64> {
        Ok(self.matching_observations(dataset, filter).count() as u64)
    }

    fn aggregate_numeric(
        &self,
        dataset: &Dataset,
        filter: &Predicate,
        aggregate: NumericAggregate,
    ) -> ObsResult<Option<f64>> {
        let values: Vec<f64> = self
            .matching_observations(dataset, filter)
            .filter_map(|o| o.value.as_f64())
            .filter(|v| v.is_finite())
            .collect();

        if values.is_empty() {
            return Ok(None);
        }

        let result = match aggregate {
            NumericAggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            NumericAggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            NumericAggregate::Avg => values.iter().sum::<f64>() / values.len() as f64,
        };
        Ok(Some(result))
    }

    fn distinct_result_times(&self, dataset: &Dataset) -> ObsResult<BTreeSet<DateTime<Utc>>> {
        Ok(self
            .observations
            .iter()
            .filter(|o| o.dataset == dataset.id)
            .filter(|o| Dataset::is_distinct_result_time(o.result_time, o.sampling_time_end))
            .filter_map(|o| o.result_time)
            .collect())
    }
}

/// Dataset joined with its referenced entities.
pub struct DatasetRow<'a> {
    dataset: &'a Dataset,
    catalog: &'a MemoryCatalog,
}

impl Row for DatasetRow<'_> {
    fn cell(&self, column: Column) -> Cell<'_> {
        let d = self.dataset;
        match column {
            Column::Own(Key::Id) => Cell::Int(d.id),
            Column::Own(Key::Identifier) => Cell::Text(&d.identifier),
            Column::Ref(dimension, Key::Id) => d.reference(dimension).into(),
            Column::Ref(dimension, Key::Identifier) => d
                .reference(dimension)
                .and_then(|id| self.catalog.entity(dimension, id))
                .map(|e| Cell::Text(&e.identifier))
                .unwrap_or(Cell::Null),
            Column::Geometry => d
                .feature
                .and_then(|id| self.catalog.entity(Dimension::Feature, id))
                .and_then(|f| f.geometry.as_ref())
                .map(Cell::Geometry)
                .unwrap_or(Cell::Null),
            Column::Published => Cell::Bool(d.published),
            Column::Deleted => Cell::Bool(d.deleted),
            Column::Disabled => Cell::Bool(d.disabled),
            Column::ValueKind => Cell::Text(&d.value_kind),
            Column::DatasetKind => Cell::Text(&d.dataset_kind),
            Column::SamplingTimeEnd => Cell::Null,
        }
    }
}

/// Describable entity; only features carry a geometry.
pub struct EntityRow<'a>(pub &'a DescribableEntity);

impl Row for EntityRow<'_> {
    fn cell(&self, column: Column) -> Cell<'_> {
        match column {
            Column::Own(Key::Id) => Cell::Int(self.0.id),
            Column::Own(Key::Identifier) => Cell::Text(&self.0.identifier),
            Column::Geometry => self.0.geometry.as_ref().map(Cell::Geometry).unwrap_or(Cell::Null),
            _ => Cell::Null,
        }
    }
}

pub struct ObservationRow<'a>(pub &'a Observation);

impl Row for ObservationRow<'_> {
    fn cell(&self, column: Column) -> Cell<'_> {
        let o = self.0;
        match column {
            Column::Own(Key::Id) => Cell::Int(o.id),
            Column::Geometry => o.geometry.as_ref().map(Cell::Geometry).unwrap_or(Cell::Null),
            Column::SamplingTimeEnd => o.sampling_time_end.into(),
            _ => Cell::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obs_common::{Geometry, Point, RawValue};
    use obs_query::{DatasetPredicates, EntityPredicates, ValueSet};
    use obs_common::TimeInterval;
    use test_utils::{assert_approx_eq, entity, quantity_series, time, DatasetBuilder};

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_entity(
                Dimension::Feature,
                entity(1, "station", "Station").with_geometry(Geometry::Point(Point::new(7.0, 51.0))),
            )
            .with_entity(Dimension::Phenomenon, entity(1, "temp", "Temperature"))
            .with_entity(Dimension::Phenomenon, entity(2, "wind", "Wind"))
            .with_dataset(DatasetBuilder::new(1).phenomenon(1).build())
            .with_dataset(DatasetBuilder::new(2).phenomenon(2).unpublished().build())
            .with_observations(quantity_series(1, &[1.0, 4.0, 7.0]))
    }

    #[test]
    fn test_find_datasets_applies_visibility() {
        let found = catalog()
            .find_datasets(&DatasetPredicates::is_public())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn test_each_visibility_conjunct_hides_dataset() {
        let hidden: [fn(&mut Dataset); 4] = [
            |d| d.feature = None,
            |d| d.published = false,
            |d| d.deleted = true,
            |d| d.disabled = true,
        ];

        for (i, hide) in hidden.iter().enumerate() {
            let mut dataset = DatasetBuilder::new(1).build();
            hide(&mut dataset);
            let catalog = MemoryCatalog::new().with_dataset(dataset);
            assert!(
                !catalog.datasets_exist(&DatasetPredicates::is_public()).unwrap(),
                "conjunct {} did not hide the dataset",
                i
            );
        }

        let visible = MemoryCatalog::new().with_dataset(DatasetBuilder::new(1).build());
        assert!(visible.datasets_exist(&DatasetPredicates::is_public()).unwrap());
    }

    #[test]
    fn test_identifier_columns_resolve_through_entities() {
        let catalog = catalog();
        let filter = Predicate::In {
            column: Column::Ref(Dimension::Phenomenon, Key::Identifier),
            values: ValueSet::Texts(["temp".to_string()].into_iter().collect()),
        };
        assert_eq!(catalog.find_datasets(&filter).unwrap().len(), 1);
    }

    #[test]
    fn test_semi_join_projects_referenced_entities() {
        let catalog = catalog();
        let filter = EntityPredicates::PHENOMENA.select_from(DatasetPredicates::is_public());
        let found = catalog.find_entities(Dimension::Phenomenon, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier, "temp");
    }

    #[test]
    fn test_aggregates() {
        let catalog = catalog();
        let dataset = catalog.find_dataset(1).unwrap();
        let all = Predicate::Always;

        assert_eq!(catalog.count_observations(&dataset, &all).unwrap(), 3);
        assert_eq!(
            catalog
                .aggregate_numeric(&dataset, &all, NumericAggregate::Min)
                .unwrap(),
            Some(1.0)
        );
        assert_eq!(
            catalog
                .aggregate_numeric(&dataset, &all, NumericAggregate::Max)
                .unwrap(),
            Some(7.0)
        );
        let avg = catalog
            .aggregate_numeric(&dataset, &all, NumericAggregate::Avg)
            .unwrap()
            .unwrap();
        assert_approx_eq!(avg, 4.0, 1e-9);

        let early = Predicate::Within {
            column: Column::SamplingTimeEnd,
            interval: TimeInterval::parse(time::FIRST_TWO_HOURS).unwrap(),
        };
        let avg = catalog
            .aggregate_numeric(&dataset, &early, NumericAggregate::Avg)
            .unwrap()
            .unwrap();
        assert_approx_eq!(avg, 2.5, 1e-9);
    }

    #[test]
    fn test_aggregate_without_numeric_values() {
        let catalog = MemoryCatalog::new()
            .with_dataset(DatasetBuilder::new(1).value_kind("text").build())
            .with_observations(test_utils::series(1, [RawValue::Text("a".into())]));
        let dataset = catalog.find_dataset(1).unwrap();
        assert_eq!(
            catalog
                .aggregate_numeric(&dataset, &Predicate::Always, NumericAggregate::Avg)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_missing_dataset_is_not_found() {
        let err = catalog().find_dataset(99).unwrap_err();
        assert!(matches!(err, ObsError::NotFound(_)));
        assert_eq!(err.http_status_code(), 404);
    }
}
