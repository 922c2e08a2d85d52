use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::ast::{Document, FragmentDefinition};
use crate::config::NormalizerConfig;
use crate::schema::SchemaState;
use crate::values::CoercionContext;

/// Read only state shared by every step of one normalization run.
pub struct NormalizationContext<'a> {
    pub schema: &'a SchemaState,
    pub config: &'a NormalizerConfig,
    pub fragments: FxHashMap<&'a str, &'a Arc<FragmentDefinition>>,
    /// Coerced variable values.
    pub variables: &'a JsonMap<String, JsonValue>,
    pub variables_pending: bool,
}

impl<'a> NormalizationContext<'a> {
    pub fn new(
        schema: &'a SchemaState,
        config: &'a NormalizerConfig,
        document: &'a Document,
        variables: &'a JsonMap<String, JsonValue>,
    ) -> Self {
        Self {
            schema,
            config,
            fragments: document
                .fragments()
                .map(|fragment| (fragment.name.as_str(), fragment))
                .collect(),
            variables,
            variables_pending: false,
        }
    }

    /// For normalizing ahead of knowing the variable values.
    pub fn with_pending_variables(mut self) -> Self {
        self.variables_pending = true;
        self
    }

    pub fn coercion(&self) -> CoercionContext<'a> {
        CoercionContext {
            variables_pending: self.variables_pending,
            ..CoercionContext::new(self.schema, self.variables)
        }
    }
}
