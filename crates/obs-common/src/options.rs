//! Output options recognised by converters and composers.

use serde::{Deserialize, Serialize};

/// Per-request output options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Emit `timestart` in addition to `timestamp`.
    #[serde(default)]
    pub show_time_intervals: bool,

    /// Emit `verticalFrom` on profile items that have one.
    #[serde(default)]
    pub show_vertical_intervals: bool,

    /// Attach valid time, result time, parameters and geometry.
    #[serde(default)]
    pub expanded: bool,

    /// Filter ids are domain identifiers instead of surrogate ids.
    #[serde(default)]
    pub use_domain_identifiers: bool,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href_base: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            show_time_intervals: false,
            show_vertical_intervals: false,
            expanded: false,
            use_domain_identifiers: false,
            locale: default_locale(),
            href_base: None,
        }
    }
}

impl QueryOptions {
    pub fn expanded() -> Self {
        Self {
            expanded: true,
            ..Self::default()
        }
    }

    /// Build an href for an entity in a collection, if a base is configured.
    pub fn href_for(&self, collection: &str, id: &str) -> Option<String> {
        self.href_base
            .as_deref()
            .map(|base| format!("{}/{}/{}", base.trim_end_matches('/'), collection, id))
    }
}

fn default_locale() -> String {
    "en".to_string()
}
