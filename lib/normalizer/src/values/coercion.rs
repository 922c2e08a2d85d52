use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::error::CoercionError;
use super::{json_to_literal, NormalizedInputValue, NormalizedValue};
use crate::ast::{TypeNode, Value};
use crate::schema::{InputObjectTypeDefinition, InputValueDefinition, SchemaState, TypeDefinition};

/// Everything needed to coerce an input value: the type system and the
/// already coerced variables a literal may refer to.
pub struct CoercionContext<'a> {
    pub schema: &'a SchemaState,
    pub variables: &'a JsonMap<String, JsonValue>,
    /// Variable values are not known yet: arguments referring to variables are
    /// left out instead of failing.
    pub variables_pending: bool,
}

impl<'a> CoercionContext<'a> {
    pub fn new(schema: &'a SchemaState, variables: &'a JsonMap<String, JsonValue>) -> Self {
        Self {
            schema,
            variables,
            variables_pending: false,
        }
    }
}

/// A raw input value that can be coerced against a declared input type.
///
/// Implemented for JSON variable values and for AST literals, so both go through
/// the same type driven rules.
pub trait InputValueSource {
    /// `Ok(None)` means the value is absent: a literal referring to a variable
    /// that was not provided.
    fn coerce(
        &self,
        ctx: &CoercionContext<'_>,
        value_type: &TypeNode,
        path: &str,
    ) -> Result<Option<NormalizedInputValue>, CoercionError>;
}

impl InputValueSource for JsonValue {
    fn coerce(
        &self,
        ctx: &CoercionContext<'_>,
        value_type: &TypeNode,
        path: &str,
    ) -> Result<Option<NormalizedInputValue>, CoercionError> {
        coerce_json(ctx, self, value_type, path).map(Some)
    }
}

impl InputValueSource for Value {
    fn coerce(
        &self,
        ctx: &CoercionContext<'_>,
        value_type: &TypeNode,
        path: &str,
    ) -> Result<Option<NormalizedInputValue>, CoercionError> {
        coerce_literal(ctx, self, value_type, path)
    }
}

fn coerce_json(
    ctx: &CoercionContext<'_>,
    value: &JsonValue,
    value_type: &TypeNode,
    path: &str,
) -> Result<NormalizedInputValue, CoercionError> {
    let type_name = value_type.to_string();

    match value_type {
        TypeNode::NonNull(inner) => {
            if value.is_null() {
                return Err(CoercionError::null(path, type_name));
            }
            let mut coerced = coerce_json(ctx, value, inner, path)?;
            coerced.type_name = type_name;
            Ok(coerced)
        }
        _ if value.is_null() => Ok(NormalizedInputValue::null(type_name)),
        TypeNode::List(inner) => {
            let items = match value {
                JsonValue::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| coerce_json(ctx, item, inner, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>, _>>()?,
                single => vec![coerce_json(ctx, single, inner, path)?],
            };
            Ok(NormalizedInputValue::new(type_name, NormalizedValue::List(items)))
        }
        TypeNode::Named(name) => {
            let coerced = match input_definition(ctx.schema, name)? {
                TypeDefinition::Scalar(_) => NormalizedValue::Scalar(json_scalar(value, name, path)?),
                TypeDefinition::Enum(definition) => match value {
                    JsonValue::String(s) if definition.values.contains(s) => {
                        NormalizedValue::Scalar(Value::Enum(s.clone()))
                    }
                    _ => return Err(CoercionError::invalid(path, name, "not a value of the enum")),
                },
                TypeDefinition::InputObject(definition) => match value {
                    JsonValue::Object(fields) => {
                        reject_unknown_fields(fields.keys(), definition, path)?;
                        let mut coerced = IndexMap::new();
                        for (field_name, field) in &definition.fields {
                            let field_path = format!("{path}.{field_name}");
                            let field_value = match fields.get(field_name) {
                                Some(v) => Some(coerce_json(ctx, v, &field.value_type, &field_path)?),
                                None => missing_input_field(ctx, field, &field_path)?,
                            };
                            if let Some(field_value) = field_value {
                                coerced.insert(field_name.clone(), field_value);
                            }
                        }
                        NormalizedValue::Object(coerced)
                    }
                    _ => return Err(CoercionError::invalid(path, name, "expected an object")),
                },
                _ => unreachable!("input_definition only returns input types"),
            };
            Ok(NormalizedInputValue::new(type_name, coerced))
        }
    }
}

fn coerce_literal(
    ctx: &CoercionContext<'_>,
    value: &Value,
    value_type: &TypeNode,
    path: &str,
) -> Result<Option<NormalizedInputValue>, CoercionError> {
    if let Value::Variable(variable) = value {
        return match ctx.variables.get(variable) {
            Some(json) => coerce_json(ctx, json, value_type, path).map(Some),
            None => Ok(None),
        };
    }

    let type_name = value_type.to_string();

    match value_type {
        TypeNode::NonNull(inner) => {
            if matches!(value, Value::Null) {
                return Err(CoercionError::null(path, type_name));
            }
            Ok(coerce_literal(ctx, value, inner, path)?.map(|mut coerced| {
                coerced.type_name = type_name;
                coerced
            }))
        }
        _ if matches!(value, Value::Null) => Ok(Some(NormalizedInputValue::null(type_name))),
        TypeNode::List(inner) => {
            let items = match value {
                Value::List(items) => {
                    let mut coerced = Vec::with_capacity(items.len());
                    for (i, item) in items.iter().enumerate() {
                        let item_path = format!("{path}[{i}]");
                        match coerce_literal(ctx, item, inner, &item_path)? {
                            Some(item) => coerced.push(item),
                            None if inner.is_non_null() => {
                                return Err(CoercionError::null(&item_path, inner))
                            }
                            None => coerced.push(NormalizedInputValue::null(inner.to_string())),
                        }
                    }
                    coerced
                }
                single => match coerce_literal(ctx, single, inner, path)? {
                    Some(item) => vec![item],
                    None => return Ok(None),
                },
            };
            Ok(Some(NormalizedInputValue::new(
                type_name,
                NormalizedValue::List(items),
            )))
        }
        TypeNode::Named(name) => {
            let coerced = match input_definition(ctx.schema, name)? {
                TypeDefinition::Scalar(_) => {
                    NormalizedValue::Scalar(literal_scalar(ctx, value, name, path)?)
                }
                TypeDefinition::Enum(definition) => match value {
                    Value::Enum(s) if definition.values.contains(s) => {
                        NormalizedValue::Scalar(value.clone())
                    }
                    _ => return Err(CoercionError::invalid(path, name, "not a value of the enum")),
                },
                TypeDefinition::InputObject(definition) => match value {
                    Value::Object(fields) => {
                        reject_unknown_fields(fields.iter().map(|f| &f.name), definition, path)?;
                        let mut coerced = IndexMap::new();
                        for (field_name, field) in &definition.fields {
                            let field_path = format!("{path}.{field_name}");
                            let provided = match value.object_field(field_name) {
                                Some(v) => coerce_literal(ctx, v, &field.value_type, &field_path)?,
                                None => None,
                            };
                            let field_value = match provided {
                                Some(v) => Some(v),
                                None => missing_input_field(ctx, field, &field_path)?,
                            };
                            if let Some(field_value) = field_value {
                                coerced.insert(field_name.clone(), field_value);
                            }
                        }
                        NormalizedValue::Object(coerced)
                    }
                    _ => return Err(CoercionError::invalid(path, name, "expected an object")),
                },
                _ => unreachable!("input_definition only returns input types"),
            };
            Ok(Some(NormalizedInputValue::new(type_name, coerced)))
        }
    }
}

fn input_definition<'s>(
    schema: &'s SchemaState,
    type_name: &str,
) -> Result<&'s TypeDefinition, CoercionError> {
    match schema.definition(type_name) {
        Some(
            definition @ (TypeDefinition::Scalar(_)
            | TypeDefinition::Enum(_)
            | TypeDefinition::InputObject(_)),
        ) => Ok(definition),
        _ => Err(CoercionError::UnknownType {
            type_name: type_name.to_string(),
        }),
    }
}

fn reject_unknown_fields<'k>(
    mut names: impl Iterator<Item = &'k String>,
    definition: &InputObjectTypeDefinition,
    path: &str,
) -> Result<(), CoercionError> {
    match names.find(|name| !definition.fields.contains_key(*name)) {
        Some(unknown) => Err(CoercionError::UnknownInputField {
            path: path.to_string(),
            field_name: unknown.clone(),
            type_name: definition.name.clone(),
        }),
        None => Ok(()),
    }
}

/// An input object field that was not provided: its default, nothing, or an error.
fn missing_input_field(
    ctx: &CoercionContext<'_>,
    field: &InputValueDefinition,
    path: &str,
) -> Result<Option<NormalizedInputValue>, CoercionError> {
    match &field.default_value {
        Some(default_value) => coerce_literal(ctx, default_value, &field.value_type, path),
        None if field.value_type.is_non_null() => {
            Err(CoercionError::null(path, &field.value_type))
        }
        None => Ok(None),
    }
}

fn int_in_range(i: i64) -> bool {
    i >= i32::MIN as i64 && i <= i32::MAX as i64
}

fn json_scalar(value: &JsonValue, type_name: &str, path: &str) -> Result<Value, CoercionError> {
    let invalid = |reason: &str| CoercionError::invalid(path, type_name, reason);

    match (type_name, value) {
        ("Int", JsonValue::Number(n)) => match n.as_i64() {
            Some(i) if int_in_range(i) => Ok(Value::Int(i)),
            Some(_) => Err(invalid("out of the 32-bit range")),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && int_in_range(f as i64) => Ok(Value::Int(f as i64)),
                _ => Err(invalid("not an integer")),
            },
        },
        ("Int", _) => Err(invalid("not an integer")),
        ("Float", JsonValue::Number(n)) => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| invalid("not a number")),
        ("Float", _) => Err(invalid("not a number")),
        ("String", JsonValue::String(s)) => Ok(Value::String(s.clone())),
        ("String", _) => Err(invalid("not a string")),
        ("Boolean", JsonValue::Bool(b)) => Ok(Value::Boolean(*b)),
        ("Boolean", _) => Err(invalid("not a boolean")),
        ("ID", JsonValue::String(s)) => Ok(Value::String(s.clone())),
        ("ID", JsonValue::Number(n)) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
        ("ID", _) => Err(invalid("not a string or an integer")),
        // custom scalars are opaque
        _ => Ok(json_to_literal(value)),
    }
}

fn literal_scalar(
    ctx: &CoercionContext<'_>,
    value: &Value,
    type_name: &str,
    path: &str,
) -> Result<Value, CoercionError> {
    let invalid = |reason: &str| CoercionError::invalid(path, type_name, reason);

    match (type_name, value) {
        ("Int", Value::Int(i)) if int_in_range(*i) => Ok(Value::Int(*i)),
        ("Int", Value::Int(_)) => Err(invalid("out of the 32-bit range")),
        ("Int", _) => Err(invalid("not an integer")),
        ("Float", Value::Int(i)) => Ok(Value::Float(*i as f64)),
        ("Float", Value::Float(f)) => Ok(Value::Float(*f)),
        ("Float", _) => Err(invalid("not a number")),
        ("String", Value::String(_)) => Ok(value.clone()),
        ("String", _) => Err(invalid("not a string")),
        ("Boolean", Value::Boolean(_)) => Ok(value.clone()),
        ("Boolean", _) => Err(invalid("not a boolean")),
        ("ID", Value::String(_)) => Ok(value.clone()),
        ("ID", Value::Int(i)) => Ok(Value::String(i.to_string())),
        ("ID", _) => Err(invalid("not a string or an integer")),
        _ => Ok(resolve_variables(ctx, value)),
    }
}

/// Inlines variable values into an opaque custom scalar literal.
fn resolve_variables(ctx: &CoercionContext<'_>, value: &Value) -> Value {
    match value {
        Value::Variable(name) => ctx
            .variables
            .get(name)
            .map_or(Value::Null, json_to_literal),
        Value::List(items) => Value::List(items.iter().map(|i| resolve_variables(ctx, i)).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|f| crate::ast::ObjectField::new(f.name.clone(), resolve_variables(ctx, &f.value)))
                .collect(),
        ),
        other => other.clone(),
    }
}
