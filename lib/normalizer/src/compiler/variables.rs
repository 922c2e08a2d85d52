use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::ast::{TypeNode, Value, VariableDefinition};
use crate::normalization::NormalizedField;
use crate::values::NormalizedInputValue;

/// Decides whether an argument value is sent as a variable or inlined as a literal.
pub trait VariablePredicate {
    fn should_make_variable(
        &self,
        field: &NormalizedField,
        argument_name: &str,
        value: &NormalizedInputValue,
    ) -> bool;
}

/// Inlines every value.
pub struct NoVariables;

impl VariablePredicate for NoVariables {
    fn should_make_variable(&self, _: &NormalizedField, _: &str, _: &NormalizedInputValue) -> bool {
        false
    }
}

/// Turns every argument value into a variable.
pub struct AllVariables;

impl VariablePredicate for AllVariables {
    fn should_make_variable(&self, _: &NormalizedField, _: &str, _: &NormalizedInputValue) -> bool {
        true
    }
}

impl<F> VariablePredicate for F
where
    F: Fn(&NormalizedField, &str, &NormalizedInputValue) -> bool,
{
    fn should_make_variable(
        &self,
        field: &NormalizedField,
        argument_name: &str,
        value: &NormalizedInputValue,
    ) -> bool {
        self(field, argument_name, value)
    }
}

/// Mints `$v0`, `$v1`, ... for the values the predicate selects.
pub(crate) struct VariableAccumulator<'p> {
    predicate: &'p dyn VariablePredicate,
    definitions: Vec<Arc<VariableDefinition>>,
    values: IndexMap<String, JsonValue>,
}

impl<'p> VariableAccumulator<'p> {
    pub fn new(predicate: &'p dyn VariablePredicate) -> Self {
        Self {
            predicate,
            definitions: vec![],
            values: IndexMap::new(),
        }
    }

    pub fn should_make_variable(
        &self,
        field: &NormalizedField,
        argument_name: &str,
        value: &NormalizedInputValue,
    ) -> bool {
        self.predicate.should_make_variable(field, argument_name, value)
    }

    /// Records `value` under a fresh variable and returns the reference to it.
    pub fn accumulate(&mut self, value: &NormalizedInputValue) -> Value {
        let name = format!("v{}", self.definitions.len());
        let var_type = TypeNode::try_from(value.type_name.as_str())
            .unwrap_or_else(|e| panic!("invalid type '{}' on an input value: {e}", value.type_name));

        trace!(variable = %name, var_type = %var_type, "variable minted");

        self.definitions.push(Arc::new(VariableDefinition {
            name: name.clone(),
            var_type,
            default_value: None,
            directives: vec![],
        }));
        self.values.insert(name.clone(), value.to_json());
        Value::Variable(name)
    }

    pub fn into_parts(self) -> (Vec<Arc<VariableDefinition>>, IndexMap<String, JsonValue>) {
        (self.definitions, self.values)
    }
}
