use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use super::coercion::{CoercionContext, InputValueSource};
use super::error::CoercionError;
use super::NormalizedInputValue;
use crate::ast::{Argument, Value};
use crate::schema::FieldDefinition;

/// The arguments of one field occurrence, resolved against its definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedArguments {
    /// Plain values, for resolvers.
    pub resolved: IndexMap<String, JsonValue>,
    /// Typed values, for printing the field back.
    pub normalized: IndexMap<String, NormalizedInputValue>,
}

fn references_variables(value: &Value) -> bool {
    let mut variables = vec![];
    value.variables(&mut variables);
    !variables.is_empty()
}

/// Resolves `arguments` in the order the field declares them.
///
/// An argument the field does not declare is ignored. A declared argument that
/// is not written falls back to its default; one whose variable was not
/// provided is left out.
pub fn resolve_field_arguments(
    ctx: &CoercionContext<'_>,
    field_definition: &FieldDefinition,
    arguments: &[Arc<Argument>],
) -> Result<ResolvedArguments, CoercionError> {
    let mut resolved = ResolvedArguments::default();

    for (name, definition) in &field_definition.arguments {
        let path = format!("{}({name}:)", field_definition.name);
        let value = match arguments.iter().find(|a| &a.name == name) {
            Some(argument) if ctx.variables_pending && references_variables(&argument.value) => {
                continue
            }
            Some(argument) => argument.value.coerce(ctx, &definition.value_type, &path)?,
            None => match &definition.default_value {
                Some(default_value) => default_value.coerce(ctx, &definition.value_type, &path)?,
                None => None,
            },
        };

        match value {
            Some(value) => {
                resolved.resolved.insert(name.clone(), value.to_json());
                resolved.normalized.insert(name.clone(), value);
            }
            None if definition.value_type.is_non_null() => {
                return Err(CoercionError::NonNullArgument {
                    field_name: field_definition.name.clone(),
                    argument_name: name.clone(),
                    type_name: definition.value_type.to_string(),
                })
            }
            None => {}
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::resolve_field_arguments;
    use crate::utils::parsing::{parse_operation, parse_schema};
    use crate::values::{CoercionContext, CoercionError};

    const SDL: &str = r#"
        type Query {
            search(term: String!, first: Int = 10, after: String): [String]
        }
    "#;

    fn first_field_arguments(query: &str) -> Vec<std::sync::Arc<crate::ast::Argument>> {
        let document = parse_operation(query);
        let operation = document.operations().next().unwrap().clone();
        match &operation.selection_set.items[0] {
            crate::ast::Selection::Field(field) => field.arguments.clone(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn resolves_defaults_and_variables() {
        let schema = parse_schema(SDL);
        let definition = schema.field_definition("Query", "search").unwrap();
        let variables = json!({ "t": "rust" }).as_object().cloned().unwrap();
        let ctx = CoercionContext::new(&schema, &variables);

        let resolved = resolve_field_arguments(
            &ctx,
            definition,
            &first_field_arguments("query ($t: String!, $a: String) { search(after: $a, term: $t) }"),
        )
        .unwrap();

        assert_eq!(resolved.resolved.keys().collect::<Vec<_>>(), vec!["term", "first"]);
        assert_eq!(resolved.resolved["term"], json!("rust"));
        assert_eq!(resolved.resolved["first"], json!(10));
        assert_eq!(resolved.normalized["first"].type_name, "Int");
    }

    #[test]
    fn pending_variables_leave_arguments_out() {
        let schema = parse_schema(SDL);
        let definition = schema.field_definition("Query", "search").unwrap();
        let variables = serde_json::Map::new();
        let ctx = CoercionContext {
            variables_pending: true,
            ..CoercionContext::new(&schema, &variables)
        };

        let resolved = resolve_field_arguments(
            &ctx,
            definition,
            &first_field_arguments("query ($t: String!) { search(term: $t, first: 3) }"),
        )
        .unwrap();

        assert_eq!(resolved.resolved.keys().collect::<Vec<_>>(), vec!["first"]);
    }

    #[test]
    fn missing_non_null_argument_is_an_error() {
        let schema = parse_schema(SDL);
        let definition = schema.field_definition("Query", "search").unwrap();
        let variables = serde_json::Map::new();
        let ctx = CoercionContext::new(&schema, &variables);

        let error = resolve_field_arguments(
            &ctx,
            definition,
            &first_field_arguments("query ($t: String) { search(term: $t) }"),
        )
        .unwrap_err();

        assert_eq!(
            error,
            CoercionError::NonNullArgument {
                field_name: "search".to_string(),
                argument_name: "term".to_string(),
                type_name: "String!".to_string()
            }
        );
    }
}
