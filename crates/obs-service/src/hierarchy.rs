//! Parent resolution for self-referential entities (procedures).

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use obs_common::{Dataset, DescribableEntity, Dimension, EntityId, ObsError, ObsResult, QueryOptions};
use storage::EntityRepository;
use tracing::{debug, warn};

use crate::output::CondensedOutput;

/// Resolves parents and ancestors over the `parents` links of entities.
///
/// The parent graph is not guaranteed to be acyclic; transitive traversal
/// keeps a visited set and a depth bound.
pub struct HierarchyResolver {
    entities: Arc<dyn EntityRepository>,
    max_depth: usize,
}

impl HierarchyResolver {
    pub fn new(entities: Arc<dyn EntityRepository>, max_depth: usize) -> Self {
        Self {
            entities,
            max_depth,
        }
    }

    /// Direct parents of `entity` in condensed form.
    ///
    /// An entity without parents is its own root and is reported as its own
    /// single parent. Only one level is resolved.
    pub fn parents_of(
        &self,
        dimension: Dimension,
        entity: &DescribableEntity,
        options: &QueryOptions,
    ) -> ObsResult<BTreeSet<CondensedOutput>> {
        if !entity.has_parents() {
            return Ok(BTreeSet::from([CondensedOutput::of(entity, dimension, options)]));
        }

        let mut parents = BTreeSet::new();
        for parent in self.load_parents(dimension, entity)? {
            parents.insert(CondensedOutput::of(&parent, dimension, options));
        }
        Ok(parents)
    }

    /// All ancestors of `entity`, nearest first, without the entity itself.
    ///
    /// Stops at `max_depth` levels. Cycles are logged and cut.
    pub fn ancestors_of(
        &self,
        dimension: Dimension,
        entity: &DescribableEntity,
    ) -> ObsResult<Vec<DescribableEntity>> {
        let mut visited: HashSet<EntityId> = HashSet::from([entity.id]);
        let mut ancestors = Vec::new();
        let mut level = vec![entity.clone()];

        for depth in 0..self.max_depth {
            let mut next = Vec::new();
            for current in &level {
                for parent in self.load_parents(dimension, current)? {
                    if visited.insert(parent.id) {
                        next.push(parent);
                    } else {
                        warn!(
                            dimension = %dimension,
                            entity = current.id,
                            parent = parent.id,
                            "Cycle in parent hierarchy"
                        );
                    }
                }
            }

            if next.is_empty() {
                return Ok(ancestors);
            }
            debug!(dimension = %dimension, depth, found = next.len(), "Resolved ancestors");
            ancestors.extend(next.iter().cloned());
            level = next;
        }

        if level.iter().any(DescribableEntity::has_parents) {
            warn!(
                dimension = %dimension,
                entity = entity.id,
                max_depth = self.max_depth,
                "Hierarchy depth limit reached"
            );
        }
        Ok(ancestors)
    }

    /// Parents of every dataset's procedure, keyed by collection name.
    pub fn hierarchical_extras(
        &self,
        datasets: &[Dataset],
        options: &QueryOptions,
    ) -> ObsResult<BTreeMap<String, BTreeSet<CondensedOutput>>> {
        let dimension = Dimension::Procedure;
        let mut extras: BTreeMap<String, BTreeSet<CondensedOutput>> = BTreeMap::new();

        for dataset in datasets {
            let procedure = match self.entities.find_entity(dimension, dataset.procedure) {
                Ok(procedure) => procedure,
                Err(ObsError::NotFound(_)) => {
                    warn!(
                        dataset = dataset.id,
                        procedure = dataset.procedure,
                        "Dataset references a missing procedure"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            let parents = self.parents_of(dimension, &procedure, options)?;
            extras
                .entry(dimension.collection().to_string())
                .or_default()
                .extend(parents);
        }
        Ok(extras)
    }

    fn load_parents(
        &self,
        dimension: Dimension,
        entity: &DescribableEntity,
    ) -> ObsResult<Vec<DescribableEntity>> {
        let mut parents = Vec::with_capacity(entity.parents.len());
        for id in &entity.parents {
            match self.entities.find_entity(dimension, *id) {
                Ok(parent) => parents.push(parent),
                Err(ObsError::NotFound(_)) => {
                    warn!(
                        dimension = %dimension,
                        entity = entity.id,
                        parent = *id,
                        "Dangling parent reference"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(parents)
    }
}
