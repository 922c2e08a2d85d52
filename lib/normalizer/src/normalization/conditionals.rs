use std::sync::Arc;

use indexmap::IndexSet;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::field::DeferExecution;
use crate::ast::{Directive, Value};

pub(crate) const SKIP_DIRECTIVE: &str = "skip";
pub(crate) const INCLUDE_DIRECTIVE: &str = "include";
pub(crate) const DEFER_DIRECTIVE: &str = "defer";

/// Evaluates `@skip`, `@include` and `@defer` against variable values.
///
/// A condition whose variable has no boolean value does not exclude anything;
/// the variable is remembered so document normalization can enumerate it.
pub(crate) struct ConditionEvaluator<'a> {
    variables: &'a JsonMap<String, JsonValue>,
    unresolved: IndexSet<String>,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(variables: &'a JsonMap<String, JsonValue>) -> Self {
        Self {
            variables,
            unresolved: IndexSet::new(),
        }
    }

    pub fn should_include(&mut self, directives: &[Arc<Directive>]) -> bool {
        for directive in directives {
            let included_when = match directive.name.as_str() {
                SKIP_DIRECTIVE => false,
                INCLUDE_DIRECTIVE => true,
                _ => continue,
            };
            if let Some(condition) = self.condition(directive) {
                if condition != included_when {
                    return false;
                }
            }
        }
        true
    }

    /// `Some` when the selection carrying `directives` is deferred.
    pub fn defer_execution(&self, directives: &[Arc<Directive>]) -> Option<DeferExecution> {
        let defer = directives.iter().find(|d| d.name == DEFER_DIRECTIVE)?;

        let enabled = match defer.argument("if") {
            Some(Value::Boolean(b)) => *b,
            Some(Value::Variable(name)) => self
                .variables
                .get(name)
                .and_then(JsonValue::as_bool)
                .unwrap_or(true),
            _ => true,
        };
        if !enabled {
            return None;
        }

        let label = match defer.argument("label") {
            Some(Value::String(label)) => Some(label.clone()),
            Some(Value::Variable(name)) => self
                .variables
                .get(name)
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            _ => None,
        };
        Some(DeferExecution::new(label))
    }

    /// Variables used by `@skip`/`@include` that had no value, in order of appearance.
    pub fn into_unresolved(self) -> IndexSet<String> {
        self.unresolved
    }

    fn condition(&mut self, directive: &Directive) -> Option<bool> {
        match directive.argument("if")? {
            Value::Boolean(b) => Some(*b),
            Value::Variable(name) => match self.variables.get(name) {
                Some(JsonValue::Bool(b)) => Some(*b),
                _ => {
                    self.unresolved.insert(name.clone());
                    None
                }
            },
            _ => None,
        }
    }
}
