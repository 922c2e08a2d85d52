use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{debug, instrument};

use super::field::{FieldArena, FieldId, NormalizedField};
use crate::ast::Argument;
use crate::schema::introspection::TYPENAME_FIELD;
use crate::schema::SchemaState;

/// Merges the fields sharing `result_key` under `parent` (the top level when
/// `None`) that resolve the same way for all of their object types.
#[instrument(level = "trace", skip(arena, schema))]
pub(crate) fn merge(
    arena: &mut FieldArena,
    parent: Option<FieldId>,
    result_key: &str,
    schema: &SchemaState,
) {
    let candidates: Vec<FieldId> = arena
        .children_of(parent)
        .iter()
        .copied()
        .filter(|id| arena.get(*id).field.result_key() == result_key)
        .collect();

    let mut groups: Vec<Vec<FieldId>> = vec![];
    for candidate in candidates {
        let field = &arena.get(candidate).field;
        // every pair in a group must be mergeable, not only a chain of them
        let group = groups.iter_mut().find(|group| {
            group
                .iter()
                .all(|member| can_be_merged(field, &arena.get(*member).field, schema))
        });
        match group {
            Some(group) => group.push(candidate),
            None => groups.push(vec![candidate]),
        }
    }

    for group in groups.into_iter().filter(|g| g.len() > 1) {
        let child_sets: Vec<Vec<FieldId>> = group
            .iter()
            .map(|id| arena.get(*id).field.children.clone())
            .collect();
        if !are_field_sets_the_same(arena, child_sets) {
            debug!(result_key, fields = group.len(), "children differ, fields are kept apart");
            continue;
        }

        let kept = group[0];
        let mut object_type_names = IndexSet::new();
        let mut defer_executions = IndexSet::new();
        let mut non_deferred = false;
        for id in &group {
            let field = &arena.get(*id).field;
            object_type_names.extend(field.object_type_names.iter().cloned());
            non_deferred |= field.defer_executions.is_empty();
            defer_executions.extend(field.defer_executions.iter().cloned());
        }

        for removed in &group[1..] {
            arena.children_of_mut(parent).retain(|id| id != removed);
            move_ast_fields(arena, kept, *removed);
        }

        let field = &mut arena.get_mut(kept).field;
        debug!(
            result_key,
            object_types = ?object_type_names,
            "merged {} fields",
            group.len()
        );
        field.object_type_names = object_type_names;
        field.defer_executions = if non_deferred {
            IndexSet::new()
        } else {
            defer_executions
        };
    }
}

fn can_be_merged(one: &NormalizedField, two: &NormalizedField, schema: &SchemaState) -> bool {
    one.field_name == two.field_name
        && same_arguments(&one.ast_arguments, &two.ast_arguments)
        && is_field_in_shared_interface(one, two, schema)
}

/// Whether the two occurrences resolve through the same field definition: the
/// same object type, or an interface both types implement that declares the field.
fn is_field_in_shared_interface(
    one: &NormalizedField,
    two: &NormalizedField,
    schema: &SchemaState,
) -> bool {
    if one.field_name == TYPENAME_FIELD {
        return true;
    }

    let one_type = &one.object_type_names[0];
    let two_type = &two.object_type_names[0];
    if one_type == two_type {
        return true;
    }

    let two_interfaces = schema.interfaces_of(two_type);
    schema
        .interfaces_of(one_type)
        .iter()
        .filter(|interface| two_interfaces.contains(interface))
        .any(|interface| schema.field_definition(interface, &one.field_name).is_some())
}

/// Same arguments by name, in any order, with structurally equal values.
pub(crate) fn same_arguments(one: &[Arc<Argument>], two: &[Arc<Argument>]) -> bool {
    one.len() == two.len()
        && one.iter().all(|argument| {
            two.iter()
                .find(|other| other.name == argument.name)
                .is_some_and(|other| argument.value.same_as(&other.value))
        })
}

/// Compares the sets level by level down to the leaves.
fn are_field_sets_the_same(arena: &FieldArena, sets: Vec<Vec<FieldId>>) -> bool {
    let Some((first, rest)) = sets.split_first() else {
        return true;
    };
    if rest.is_empty() {
        return true;
    }
    if !rest.iter().all(|set| same_field_set(arena, first, set)) {
        return false;
    }

    let next_level = sets
        .iter()
        .flatten()
        .map(|id| arena.get(*id).field.children.clone())
        .collect();
    are_field_sets_the_same(arena, next_level)
}

fn same_field_set(arena: &FieldArena, one: &[FieldId], two: &[FieldId]) -> bool {
    one.len() == two.len()
        && one.iter().all(|a| {
            two.iter().any(|b| {
                same_without_children(&arena.get(*a).field, &arena.get(*b).field)
            })
        })
}

fn same_without_children(one: &NormalizedField, two: &NormalizedField) -> bool {
    one.object_type_names == two.object_type_names
        && one.alias == two.alias
        && one.field_name == two.field_name
        && same_arguments(&one.ast_arguments, &two.ast_arguments)
}

/// Hands the AST fields of `removed` and of its subtree over to the matching
/// fields under `kept`.
fn move_ast_fields(arena: &mut FieldArena, kept: FieldId, removed: FieldId) {
    let ast_fields = std::mem::take(&mut arena.get_mut(removed).ast_fields);
    let kept_ast_fields = &mut arena.get_mut(kept).ast_fields;
    for ast_field in ast_fields {
        // fields split per object type share their AST fields
        if !kept_ast_fields.iter().any(|f| Arc::ptr_eq(f, &ast_field)) {
            kept_ast_fields.push(ast_field);
        }
    }

    let removed_children = arena.get(removed).field.children.clone();
    for removed_child in removed_children {
        let counterpart = arena
            .get(kept)
            .field
            .children
            .iter()
            .copied()
            .find(|kept_child| {
                same_without_children(&arena.get(*kept_child).field, &arena.get(removed_child).field)
            });
        if let Some(kept_child) = counterpart {
            move_ast_fields(arena, kept_child, removed_child);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map as JsonMap;

    use crate::config::NormalizerConfig;
    use crate::normalization::normalize_operation_with_raw_variables;
    use crate::utils::parsing::{parse_operation, parse_schema};

    const SDL: &str = r#"
        interface Named { name: String }
        interface Labeled { name: String }
        type Author implements Named { name: String }
        type Book implements Named & Labeled { name: String }
        type Shelf implements Labeled { name: String }
        union Item = Author | Book | Shelf
        type Query { item: Item }
    "#;

    #[test]
    fn merges_only_types_sharing_an_interface_pairwise() {
        let schema = parse_schema(SDL);
        let document = parse_operation(
            r#"
            {
              item {
                ... on Author { name }
                ... on Book { name }
                ... on Shelf { name }
              }
            }
            "#,
        );

        let operation = normalize_operation_with_raw_variables(
            &schema,
            &document,
            None,
            &JsonMap::new(),
            &NormalizerConfig::default(),
        )
        .unwrap();

        insta::assert_snapshot!(operation, @r"
        query {
          Query.item {
            [Author, Book].name
            Shelf.name
          }
        }
        ");
    }
}
