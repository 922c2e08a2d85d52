//! Typed input values: coercion of variables and arguments against the schema.

mod arguments;
mod coercion;
mod error;
mod variables;

use std::fmt::Display;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::ast::{ObjectField, Value};

pub use arguments::{resolve_field_arguments, ResolvedArguments};
pub use coercion::{CoercionContext, InputValueSource};
pub use error::CoercionError;
pub use variables::{coerce_variable_values, CoercedVariables};

/// An input value annotated with the type it was coerced to.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInputValue {
    /// The declared type, printed, e.g. `[Int!]!`.
    pub type_name: String,
    pub value: NormalizedValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Null,
    /// A scalar or enum literal. Never a variable.
    Scalar(Value),
    List(Vec<NormalizedInputValue>),
    Object(IndexMap<String, NormalizedInputValue>),
}

impl NormalizedInputValue {
    pub fn new(type_name: impl Into<String>, value: NormalizedValue) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }

    pub fn null(type_name: impl Into<String>) -> Self {
        Self::new(type_name, NormalizedValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, NormalizedValue::Null)
    }

    /// Plain JSON form, as handed to resolvers or sent along as a variable value.
    pub fn to_json(&self) -> JsonValue {
        match &self.value {
            NormalizedValue::Null => JsonValue::Null,
            NormalizedValue::Scalar(literal) => literal_to_json(literal),
            NormalizedValue::List(items) => {
                JsonValue::Array(items.iter().map(|i| i.to_json()).collect())
            }
            NormalizedValue::Object(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Literal form, for printing the value back into a document.
    pub fn to_literal(&self) -> Value {
        match &self.value {
            NormalizedValue::Null => Value::Null,
            NormalizedValue::Scalar(literal) => literal.clone(),
            NormalizedValue::List(items) => Value::List(items.iter().map(|i| i.to_literal()).collect()),
            NormalizedValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| ObjectField::new(name.clone(), value.to_literal()))
                    .collect(),
            ),
        }
    }
}

impl Display for NormalizedInputValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_literal())
    }
}

pub fn literal_to_json(literal: &Value) -> JsonValue {
    match literal {
        Value::Null | Value::Variable(_) => JsonValue::Null,
        Value::Int(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) | Value::Enum(s) => JsonValue::String(s.clone()),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::List(items) => JsonValue::Array(items.iter().map(literal_to_json).collect()),
        Value::Object(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|f| (f.name.clone(), literal_to_json(&f.value)))
                .collect::<JsonMap<_, _>>(),
        ),
    }
}

pub fn json_to_literal(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(json_to_literal).collect()),
        JsonValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| ObjectField::new(name.clone(), json_to_literal(value)))
                .collect(),
        ),
    }
}
