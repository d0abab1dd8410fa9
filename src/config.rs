//! Run configuration: metadata filters and fail-fast.
//!
//! ```yaml
//! inclusion_filter:
//!   key: focus
//! exclusion_filter:
//!   key: slow
//!   value: true
//! fail_fast: true
//! ```

use serde::{Deserialize, Serialize};

use crate::diagnostics::ExemplarError;
use crate::metadata::Metadata;
use crate::value::Value;

/// Selects examples whose metadata maps `key` to `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub key: String,
    #[serde(default = "MetadataFilter::default_value")]
    pub value: Value,
}

impl MetadataFilter {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn default_value() -> Value {
        Value::Bool(true)
    }

    /// Symbols and strings compare by text, since config files cannot spell symbols.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match metadata.get(&self.key) {
            Some(found) if *found == self.value => true,
            Some(found) => matches!(
                (found.as_str(), self.value.as_str()),
                (Some(a), Some(b)) if a == b
            ),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// When set, only matching examples run.
    pub inclusion_filter: Option<MetadataFilter>,
    /// Matching examples are skipped.
    pub exclusion_filter: Option<MetadataFilter>,
    /// Skip everything after the first failed example.
    pub fail_fast: bool,
}

impl RunConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ExemplarError> {
        serde_yaml::from_str(source)
            .map_err(|e| ExemplarError::config("invalid YAML run configuration", e))
    }

    pub fn from_json_str(source: &str) -> Result<Self, ExemplarError> {
        serde_json::from_str(source)
            .map_err(|e| ExemplarError::config("invalid JSON run configuration", e))
    }

    pub fn including(mut self, filter: MetadataFilter) -> Self {
        self.inclusion_filter = Some(filter);
        self
    }

    pub fn excluding(mut self, filter: MetadataFilter) -> Self {
        self.exclusion_filter = Some(filter);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Whether an example with `metadata` passes both filters.
    pub fn selects(&self, metadata: &Metadata) -> bool {
        let included = self
            .inclusion_filter
            .as_ref()
            .map_or(true, |f| f.matches(metadata));
        let excluded = self
            .exclusion_filter
            .as_ref()
            .is_some_and(|f| f.matches(metadata));
        included && !excluded
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_default_selects_everything() {
        let config = RunConfig::default();
        assert!(config.selects(&Metadata::new()));
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_yaml_loading() {
        let config = RunConfig::from_yaml_str(
            "inclusion_filter:\n  key: focus\nexclusion_filter:\n  key: speed\n  value: slow\nfail_fast: true\n",
        )
        .unwrap();
        assert_eq!(config.inclusion_filter, Some(MetadataFilter::new("focus", true)));
        assert_eq!(config.exclusion_filter, Some(MetadataFilter::new("speed", "slow")));
        assert!(config.fail_fast);
    }

    #[test]
    fn test_json_loading_and_errors() {
        let config = RunConfig::from_json_str(r#"{"fail_fast": true}"#).unwrap();
        assert!(config.fail_fast);
        assert!(config.inclusion_filter.is_none());

        let err = RunConfig::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().contains("invalid JSON run configuration"));
    }

    #[test]
    fn test_filters() {
        let config = RunConfig::default()
            .including(MetadataFilter::new("focus", true))
            .excluding(MetadataFilter::new("speed", "slow"));
        assert!(config.selects(&Metadata::new().with("focus", true)));
        assert!(!config.selects(&Metadata::new()));
        assert!(!config.selects(
            &Metadata::new().with("focus", true).with("speed", Value::symbol("slow"))
        ));
    }
}
