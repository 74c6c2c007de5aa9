//! Type dispatch: (dataset kind, observation kind, value kind) -> converter.
//!
//! Converters are registered in a static descriptor table. Resolution
//! derives a composite [`TypeKey`], looks the key up in the table and
//! memoizes the constructed converter for the lifetime of the registry.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use obs_common::{Dataset, ObsError, ObsResult};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::debug;

use crate::converter::{ValueConverter, ValueKind};
use crate::nodata::NoDataValues;

const TRAJECTORY: &str = "trajectory";
const SIMPLE: &str = "simple";

/// Composite lookup key, e.g. `quantity`, `quantity-trajectory`,
/// `text-complex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(String);

impl TypeKey {
    /// Derive the key in priority order: trajectory datasets, then
    /// non-simple observation kinds, then the bare value kind.
    pub fn derive(dataset_kind: &str, observation_kind: &str, value_kind: &str) -> Self {
        let value_kind = value_kind.trim().to_ascii_lowercase();
        let dataset_kind = dataset_kind.trim();
        let observation_kind = observation_kind.trim();

        if !dataset_kind.is_empty() && dataset_kind.eq_ignore_ascii_case(TRAJECTORY) {
            TypeKey(format!("{}-{}", value_kind, TRAJECTORY))
        } else if !observation_kind.is_empty() && !observation_kind.eq_ignore_ascii_case(SIMPLE) {
            TypeKey(format!(
                "{}-{}",
                value_kind,
                observation_kind.to_ascii_lowercase()
            ))
        } else {
            TypeKey(value_kind)
        }
    }

    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self::derive(
            &dataset.dataset_kind,
            &dataset.observation_kind,
            &dataset.value_kind,
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base value kind: the key up to the first `-`.
    pub fn base(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static registration of one converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterDescriptor {
    /// Type key the converter handles.
    pub kind: &'static str,
    /// Dataset entity flavour the converter is written for.
    pub dataset_entity: &'static str,
    pub value_kind: ValueKind,
}

/// All converters known to the registry.
pub const DESCRIPTORS: &[ConverterDescriptor] = &[
    ConverterDescriptor {
        kind: "quantity",
        dataset_entity: "QuantityDataset",
        value_kind: ValueKind::Quantity,
    },
    ConverterDescriptor {
        kind: "count",
        dataset_entity: "CountDataset",
        value_kind: ValueKind::Count,
    },
    ConverterDescriptor {
        kind: "text",
        dataset_entity: "TextDataset",
        value_kind: ValueKind::Text,
    },
    ConverterDescriptor {
        kind: "profile",
        dataset_entity: "ProfileDataset",
        value_kind: ValueKind::Profile,
    },
    ConverterDescriptor {
        kind: "quantity-profile",
        dataset_entity: "QuantityProfileDataset",
        value_kind: ValueKind::Profile,
    },
    ConverterDescriptor {
        kind: "text-profile",
        dataset_entity: "TextProfileDataset",
        value_kind: ValueKind::Profile,
    },
    ConverterDescriptor {
        kind: "quantity-trajectory",
        dataset_entity: "QuantityTrajectoryDataset",
        value_kind: ValueKind::Quantity,
    },
    ConverterDescriptor {
        kind: "count-trajectory",
        dataset_entity: "CountTrajectoryDataset",
        value_kind: ValueKind::Count,
    },
    ConverterDescriptor {
        kind: "text-trajectory",
        dataset_entity: "TextTrajectoryDataset",
        value_kind: ValueKind::Text,
    },
    ConverterDescriptor {
        kind: "text-complex",
        dataset_entity: "TextComplexDataset",
        value_kind: ValueKind::Text,
    },
];

/// Resolves and caches value converters.
///
/// Reads never block each other; a write lock is taken only the first
/// time a key is resolved.
pub struct TypeDispatchRegistry {
    descriptors: &'static [ConverterDescriptor],
    no_data: Arc<NoDataValues>,
    cache: RwLock<HashMap<TypeKey, Arc<ValueConverter>>>,
    known_types: OnceCell<BTreeSet<String>>,
}

impl TypeDispatchRegistry {
    pub fn new(no_data: Arc<NoDataValues>) -> Self {
        Self::with_descriptors(DESCRIPTORS, no_data)
    }

    pub fn with_descriptors(
        descriptors: &'static [ConverterDescriptor],
        no_data: Arc<NoDataValues>,
    ) -> Self {
        Self {
            descriptors,
            no_data,
            cache: RwLock::new(HashMap::new()),
            known_types: OnceCell::new(),
        }
    }

    pub fn no_data(&self) -> &Arc<NoDataValues> {
        &self.no_data
    }

    /// Converter for the kinds, or `UnknownType` if none is registered.
    ///
    /// Repeated calls with the same derived key return the same instance.
    pub fn resolve(
        &self,
        dataset_kind: &str,
        observation_kind: &str,
        value_kind: &str,
    ) -> ObsResult<Arc<ValueConverter>> {
        self.resolve_key(TypeKey::derive(dataset_kind, observation_kind, value_kind))
    }

    /// Converter for the dataset's recorded kinds.
    pub fn resolve_for(&self, dataset: &Dataset) -> ObsResult<Arc<ValueConverter>> {
        self.resolve_key(TypeKey::for_dataset(dataset))
    }

    fn resolve_key(&self, key: TypeKey) -> ObsResult<Arc<ValueConverter>> {
        if let Some(converter) = self.cache.read().get(&key) {
            return Ok(Arc::clone(converter));
        }

        let mut cache = self.cache.write();
        // another thread may have filled the key meanwhile
        if let Some(converter) = cache.get(&key) {
            return Ok(Arc::clone(converter));
        }

        let descriptor = self
            .descriptor(&key)
            .ok_or_else(|| ObsError::UnknownType(key.to_string()))?;
        let converter = Arc::new(ValueConverter::for_kind(
            descriptor.value_kind,
            Arc::clone(&self.no_data),
        ));
        debug!(
            key = %key,
            dataset_entity = descriptor.dataset_entity,
            "Cached value converter"
        );
        cache.insert(key, Arc::clone(&converter));
        Ok(converter)
    }

    fn descriptor(&self, key: &TypeKey) -> Option<&'static ConverterDescriptor> {
        self.descriptors.iter().find(|d| d.kind == key.as_str())
    }

    /// Whether a converter exists for the kinds. Checks the cache first,
    /// then the descriptor table.
    pub fn is_known(&self, dataset_kind: &str, observation_kind: &str, value_kind: &str) -> bool {
        let key = TypeKey::derive(dataset_kind, observation_kind, value_kind);
        self.cache.read().contains_key(&key) || self.descriptor(&key).is_some()
    }

    /// Base value kinds of all registered converters.
    pub fn known_types(&self) -> &BTreeSet<String> {
        self.known_types.get_or_init(|| {
            self.descriptors
                .iter()
                .map(|d| {
                    d.kind
                        .split('-')
                        .next()
                        .unwrap_or(d.kind)
                        .to_string()
                })
                .collect()
        })
    }

    /// Number of memoized converters.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }
}

impl fmt::Debug for TypeDispatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDispatchRegistry")
            .field("descriptors", &self.descriptors.len())
            .field("cached", &self.cached())
            .finish()
    }
}
