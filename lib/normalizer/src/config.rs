use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NormalizerConfig {
    /// The maximum nesting level of a normalized field. Root fields are at level 1.
    /// Operations nesting deeper than this are rejected, which guards against
    /// maliciously deep documents.
    ///
    /// Default: 100.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// The maximum number of normalized fields a single operation may produce.
    ///
    /// Default: 100000.
    #[serde(default = "default_max_fields_count")]
    pub max_fields_count: usize,
    /// The maximum number of distinct `@skip`/`@include` variables an operation
    /// may use when a whole document is normalized. Each variable doubles the
    /// number of operation variants built.
    ///
    /// Default: 10.
    #[serde(default = "default_max_skip_include_variables")]
    pub max_skip_include_variables: usize,
    /// Whether `@defer` on fragments is tracked on the normalized fields and
    /// re-emitted when compiling them back into a document.
    #[serde(default = "default_defer_support")]
    pub defer_support: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_fields_count: default_max_fields_count(),
            max_skip_include_variables: default_max_skip_include_variables(),
            defer_support: default_defer_support(),
        }
    }
}

fn default_max_depth() -> usize {
    100
}

fn default_max_fields_count() -> usize {
    100_000
}

fn default_max_skip_include_variables() -> usize {
    10
}

fn default_defer_support() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::NormalizerConfig;

    #[test]
    fn fills_in_defaults() {
        let config: NormalizerConfig = serde_json::from_str(r#"{ "max_depth": 5 }"#).unwrap();

        assert_eq!(
            config,
            NormalizerConfig {
                max_depth: 5,
                ..NormalizerConfig::default()
            }
        );
        assert!(serde_json::from_str::<NormalizerConfig>(r#"{ "depth": 5 }"#).is_err());
    }

    #[test]
    fn exposes_json_schema() {
        let schema = schemars::schema_for!(NormalizerConfig);
        let json = serde_json::to_value(&schema).unwrap();

        assert!(json["properties"]["defer_support"].is_object());
        assert!(json["properties"]["max_fields_count"].is_object());
    }
}
