//! Data-access configuration loading.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use obs_common::{ObsError, ObsResult, QueryOptions};
use obs_values::NoDataValues;
use serde::{Deserialize, Deserializer, Serialize};

pub const ENV_NO_DATA_VALUES: &str = "OBS_NO_DATA_VALUES";
pub const ENV_DEFAULT_LOCALE: &str = "OBS_DEFAULT_LOCALE";
pub const ENV_HREF_BASE: &str = "OBS_HREF_BASE";
pub const ENV_MAX_HIERARCHY_DEPTH: &str = "OBS_MAX_HIERARCHY_DEPTH";
pub const ENV_MATCH_DOMAIN_IDS: &str = "OBS_MATCH_DOMAIN_IDS";

/// Service-wide settings, loaded once and treated as immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaoConfig {
    /// Sentinels for missing measurements. YAML accepts a list or a single
    /// comma separated string.
    #[serde(deserialize_with = "list_or_csv")]
    pub no_data_values: Vec<String>,

    pub default_locale: String,

    pub href_base: Option<String>,

    /// Upper bound for transitive ancestor traversal.
    pub max_hierarchy_depth: usize,

    /// Default for requests that do not say whether filter ids are domain
    /// identifiers.
    pub match_domain_ids: bool,
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            no_data_values: Vec::new(),
            default_locale: "en".to_string(),
            href_base: None,
            max_hierarchy_depth: 32,
            match_domain_ids: false,
        }
    }
}

impl DaoConfig {
    /// Load from a YAML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config: DaoConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;

        tracing::info!(
            path = %path.display(),
            no_data_values = config.no_data_values.len(),
            "Loaded data-access config"
        );
        Ok(config)
    }

    /// Defaults overlaid with `OBS_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Overlay `OBS_*` environment variables on this config.
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Overlay variables from `lookup`. Unparsable numbers and booleans keep
    /// the current value.
    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(csv) = lookup(ENV_NO_DATA_VALUES) {
            self.no_data_values = split_csv(&csv);
        }
        if let Some(locale) = lookup(ENV_DEFAULT_LOCALE) {
            self.default_locale = locale;
        }
        if let Some(base) = lookup(ENV_HREF_BASE) {
            self.href_base = Some(base).filter(|b| !b.is_empty());
        }
        if let Some(depth) = lookup(ENV_MAX_HIERARCHY_DEPTH).and_then(|s| s.parse().ok()) {
            self.max_hierarchy_depth = depth;
        }
        if let Some(flag) = lookup(ENV_MATCH_DOMAIN_IDS).and_then(|s| s.parse().ok()) {
            self.match_domain_ids = flag;
        }
        self
    }

    pub fn validate(&self) -> ObsResult<()> {
        if self.max_hierarchy_depth == 0 {
            return Err(ObsError::Config(
                "max_hierarchy_depth must be at least 1".to_string(),
            ));
        }
        if self.default_locale.trim().is_empty() {
            return Err(ObsError::Config("default_locale must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parsed sentinel set, built once per configuration.
    pub fn no_data(&self) -> Arc<NoDataValues> {
        Arc::new(NoDataValues::new(self.no_data_values.iter().cloned()))
    }

    /// Request options seeded with the configured defaults.
    pub fn default_options(&self) -> QueryOptions {
        QueryOptions {
            use_domain_identifiers: self.match_domain_ids,
            locale: self.default_locale.clone(),
            href_base: self.href_base.clone(),
            ..QueryOptions::default()
        }
    }
}

fn split_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<serde_yaml::Value>),
        Csv(String),
    }

    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::Csv(csv) => split_csv(&csv),
        // numeric sentinels are written unquoted in YAML
        ListOrCsv::List(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_yaml::Value::String(s) => Some(s),
                serde_yaml::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
    })
}
