use indexmap::{IndexMap, IndexSet};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{instrument, trace};

use super::collector::{CollectedField, FieldCollector};
use super::conditionals::ConditionEvaluator;
use super::context::NormalizationContext;
use super::error::NormalizationError;
use super::field::{FieldArena, FieldId, NormalizedField, NormalizedFieldBuilder};
use super::merger;
use super::operation::NormalizedOperation;
use crate::ast::OperationDefinition;
use crate::values::{resolve_field_arguments, CoercedVariables};

/// Collected fields that become one normalized field.
struct CollectedFieldGroup {
    fields: Vec<CollectedField>,
    object_types: IndexSet<String>,
}

/// Builds the normalized field tree of one operation level by level.
pub(crate) struct NormalizedOperationFactory<'a> {
    ctx: &'a NormalizationContext<'a>,
    conditions: ConditionEvaluator<'a>,
    arena: FieldArena,
    /// Collected fields behind each created field, consumed when its children are built.
    collected: Vec<Vec<CollectedField>>,
    possible_mergers: Vec<(Option<FieldId>, String)>,
    field_count: usize,
    max_depth_seen: usize,
}

impl<'a> NormalizedOperationFactory<'a> {
    /// `condition_values` answer `@skip`/`@include`/`@defer`, usually the
    /// coerced variables themselves.
    pub fn new(
        ctx: &'a NormalizationContext<'a>,
        condition_values: &'a JsonMap<String, JsonValue>,
    ) -> Self {
        Self {
            ctx,
            conditions: ConditionEvaluator::new(condition_values),
            arena: FieldArena::default(),
            collected: vec![],
            possible_mergers: vec![],
            field_count: 0,
            max_depth_seen: 0,
        }
    }

    #[instrument(level = "trace", skip_all, fields(operation = operation.name.as_deref()))]
    pub fn create(
        mut self,
        operation: &OperationDefinition,
        variables: CoercedVariables,
    ) -> Result<(NormalizedOperation, IndexSet<String>), NormalizationError> {
        let root_type = self
            .ctx
            .schema
            .root_type_name(operation.kind)
            .ok_or(NormalizationError::MissingRootType {
                operation_kind: operation.kind,
            })?
            .to_string();

        let possible_types = IndexSet::from([root_type.clone()]);
        let top_level = FieldCollector::new(self.ctx, &mut self.conditions).collect(
            &operation.selection_set,
            &possible_types,
            &root_type,
        );
        self.build_level(None, top_level, 0)?;

        // children first, so a parent compares already merged child sets
        for (parent, result_key) in std::mem::take(&mut self.possible_mergers).iter().rev() {
            merger::merge(&mut self.arena, *parent, result_key, self.ctx.schema);
        }

        trace!(
            field_count = self.field_count,
            max_depth = self.max_depth_seen,
            "normalized field tree built"
        );

        let normalized = NormalizedOperation::freeze(
            operation.kind,
            operation.name.clone(),
            self.arena,
            variables,
            self.field_count,
            self.max_depth_seen,
        );
        Ok((normalized, self.conditions.into_unresolved()))
    }

    /// Creates the children of `parent` from `collected` and recurses into them.
    /// `level` is the level of `parent`, 0 for the operation itself.
    fn build_level(
        &mut self,
        parent: Option<FieldId>,
        collected: Vec<CollectedField>,
        level: usize,
    ) -> Result<(), NormalizationError> {
        if level > self.max_depth_seen {
            self.max_depth_seen = level;
            if level > self.ctx.config.max_depth {
                return Err(NormalizationError::MaxDepthExceeded {
                    depth: level,
                    max_depth: self.ctx.config.max_depth,
                });
            }
        }

        let mut by_result_key: IndexMap<String, Vec<CollectedField>> = IndexMap::new();
        for field in collected {
            by_result_key
                .entry(field.field.result_key().to_string())
                .or_default()
                .push(field);
        }

        let mut created = vec![];
        for (result_key, fields) in by_result_key {
            let groups = group_by_common_parents(fields);
            if groups.len() > 1 {
                self.possible_mergers.push((parent, result_key));
            }
            for group in groups {
                created.push(self.create_field(group, level + 1, parent)?);
            }
        }

        for child in created {
            let collected = self.collect_children(child);
            self.build_level(Some(child), collected, level + 1)?;
        }

        Ok(())
    }

    fn create_field(
        &mut self,
        group: CollectedFieldGroup,
        level: usize,
        parent: Option<FieldId>,
    ) -> Result<FieldId, NormalizationError> {
        self.field_count += 1;
        if self.field_count > self.ctx.config.max_fields_count {
            return Err(NormalizationError::MaxFieldsCountExceeded {
                count: self.field_count,
                max_fields_count: self.ctx.config.max_fields_count,
            });
        }

        let ast_field = group.fields[0].field.clone();
        let type_name = &group.object_types[0];
        let definition = self
            .ctx
            .schema
            .field_definition(type_name, &ast_field.name)
            .ok_or_else(|| NormalizationError::FieldNotFoundInType {
                field_name: ast_field.name.clone(),
                type_name: type_name.clone(),
            })?;
        let arguments =
            resolve_field_arguments(&self.ctx.coercion(), definition, &ast_field.arguments)?;

        let defer_executions = if group.fields.iter().any(|f| f.defer.is_none()) {
            IndexSet::new()
        } else {
            group.fields.iter().filter_map(|f| f.defer.clone()).collect()
        };

        let id = self.arena.push(NormalizedFieldBuilder {
            field: NormalizedField {
                field_name: ast_field.name.clone(),
                alias: ast_field.alias.clone(),
                object_type_names: group.object_types,
                resolved_arguments: arguments.resolved,
                normalized_arguments: arguments.normalized,
                ast_arguments: ast_field.arguments.clone(),
                children: vec![],
                parent,
                level,
                defer_executions,
            },
            ast_fields: group.fields.iter().map(|f| f.field.clone()).collect(),
        });
        self.collected.push(group.fields);

        Ok(id)
    }

    /// Collects the sub-selections of every AST field behind `id`. Only the
    /// field itself is deferred, its sub-selections are not.
    fn collect_children(&mut self, id: FieldId) -> Vec<CollectedField> {
        let schema = self.ctx.schema;
        let field = &self.arena.get(id).field;

        let mut possible_types = IndexSet::new();
        for definition in field.field_definitions(schema) {
            possible_types.extend(schema.possible_object_types(definition.field_type.inner_type()));
        }
        if possible_types.is_empty() {
            return vec![];
        }

        let occurrences = std::mem::take(&mut self.collected[id.0]);
        let mut result = vec![];
        let mut collector = FieldCollector::new(self.ctx, &mut self.conditions);
        for occurrence in occurrences {
            let Some(selection_set) = &occurrence.field.selection_set else {
                continue;
            };
            let definition = schema
                .field_definition(&occurrence.ast_type_condition, &occurrence.field.name)
                .unwrap_or_else(|| {
                    panic!(
                        "type '{}' has no field '{}'",
                        occurrence.ast_type_condition, occurrence.field.name
                    )
                });
            collector.collect_into(
                selection_set,
                &possible_types,
                definition.field_type.inner_type(),
                None,
                &mut result,
            );
        }
        result
    }
}

/// One group when all occurrences were written against the same type,
/// otherwise one group per concrete object type.
fn group_by_common_parents(fields: Vec<CollectedField>) -> Vec<CollectedFieldGroup> {
    let mut all_object_types = IndexSet::new();
    for field in &fields {
        all_object_types.extend(field.object_types.iter().cloned());
    }

    let first_condition = &fields[0].ast_type_condition;
    if fields.iter().all(|f| &f.ast_type_condition == first_condition) {
        return vec![CollectedFieldGroup {
            fields,
            object_types: all_object_types,
        }];
    }

    all_object_types
        .into_iter()
        .map(|object_type| CollectedFieldGroup {
            fields: fields
                .iter()
                .filter(|f| f.object_types.contains(&object_type))
                .cloned()
                .collect(),
            object_types: IndexSet::from([object_type]),
        })
        .collect()
}
