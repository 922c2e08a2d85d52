use std::fmt::{Display, Formatter as FmtFormatter, Result as FmtResult};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::field::{FieldArena, FieldCoordinates, FieldId, NormalizedField};
use crate::ast::{Field, OperationKind};
use crate::schema::introspection::TYPENAME_FIELD;
use crate::schema::{SchemaState, TypeDefinition};
use crate::utils::pretty_display::{get_indent, PrettyDisplay};
use crate::values::CoercedVariables;

/// The executable form of an operation: a tree of [`NormalizedField`]s plus
/// lookups from the AST and from schema coordinates into it.
#[derive(Debug)]
pub struct NormalizedOperation {
    operation_kind: OperationKind,
    operation_name: Option<String>,
    fields: Vec<NormalizedField>,
    top_level_fields: Vec<FieldId>,
    /// The AST fields each normalized field was built from, by field index.
    merged_fields: Vec<Vec<Arc<Field>>>,
    /// Keyed by the address of the AST field.
    ast_field_to_normalized: FxHashMap<usize, Vec<FieldId>>,
    coordinates_to_normalized: FxHashMap<FieldCoordinates, Vec<FieldId>>,
    variables: CoercedVariables,
    field_count: usize,
    max_depth: usize,
}

fn ast_field_key(field: &Arc<Field>) -> usize {
    Arc::as_ptr(field) as usize
}

impl NormalizedOperation {
    /// Keeps the fields reachable from the top level, renumbered in pre-order.
    pub(crate) fn freeze(
        operation_kind: OperationKind,
        operation_name: Option<String>,
        arena: FieldArena,
        variables: CoercedVariables,
        field_count: usize,
        max_depth: usize,
    ) -> Self {
        let mut order = vec![];
        let mut stack: Vec<FieldId> = arena.top_level.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(arena.get(id).field.children.iter().rev().copied());
        }

        let new_ids: FxHashMap<FieldId, FieldId> = order
            .iter()
            .enumerate()
            .map(|(index, old)| (*old, FieldId(index)))
            .collect();
        let remap = |id: &FieldId| new_ids[id];

        let mut arena_fields: Vec<Option<_>> = arena.fields.into_iter().map(Some).collect();
        let mut fields = Vec::with_capacity(order.len());
        let mut merged_fields = Vec::with_capacity(order.len());
        let mut ast_field_to_normalized: FxHashMap<usize, Vec<FieldId>> = FxHashMap::default();
        let mut coordinates_to_normalized: FxHashMap<FieldCoordinates, Vec<FieldId>> =
            FxHashMap::default();

        for old in &order {
            let builder = arena_fields[old.0]
                .take()
                .expect("a field is reachable through a single parent");
            let id = remap(old);
            let mut field = builder.field;
            field.children = field.children.iter().map(remap).collect();
            field.parent = field.parent.as_ref().map(remap);

            for ast_field in &builder.ast_fields {
                ast_field_to_normalized
                    .entry(ast_field_key(ast_field))
                    .or_default()
                    .push(id);
            }
            for type_name in &field.object_type_names {
                coordinates_to_normalized
                    .entry(FieldCoordinates::new(type_name.clone(), field.field_name.clone()))
                    .or_default()
                    .push(id);
            }

            fields.push(field);
            merged_fields.push(builder.ast_fields);
        }

        Self {
            operation_kind,
            operation_name,
            fields,
            top_level_fields: arena.top_level.iter().map(remap).collect(),
            merged_fields,
            ast_field_to_normalized,
            coordinates_to_normalized,
            variables,
            field_count,
            max_depth,
        }
    }

    pub fn operation_kind(&self) -> OperationKind {
        self.operation_kind
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    pub fn top_level_fields(&self) -> &[FieldId] {
        &self.top_level_fields
    }

    /// # Panics
    /// If `id` does not belong to this operation.
    pub fn field(&self, id: FieldId) -> &NormalizedField {
        &self.fields[id.0]
    }

    /// Every field, parents before their children.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &NormalizedField)> {
        self.fields.iter().enumerate().map(|(i, f)| (FieldId(i), f))
    }

    /// Variable values the operation was normalized with.
    pub fn coerced_variables(&self) -> &CoercedVariables {
        &self.variables
    }

    /// Normalized fields created from `field`. One AST field yields several
    /// normalized fields when it spans types that could not be merged.
    pub fn normalized_fields_for(&self, field: &Arc<Field>) -> &[FieldId] {
        self.ast_field_to_normalized
            .get(&ast_field_key(field))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Normalized fields resolving `type_name.field_name`.
    pub fn normalized_fields_at(&self, coordinates: &FieldCoordinates) -> &[FieldId] {
        self.coordinates_to_normalized
            .get(coordinates)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The AST fields `id` was built from, including those of merged fields.
    pub fn merged_field(&self, id: FieldId) -> &[Arc<Field>] {
        &self.merged_fields[id.0]
    }

    /// Number of normalized fields created, merged ones included.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Level of the deepest field.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Children of `parent` (the top level when `None`) answering under `result_key`.
    pub fn children_with_same_result_key(
        &self,
        parent: Option<FieldId>,
        result_key: &str,
    ) -> Vec<FieldId> {
        let children = match parent {
            Some(parent) => self.field(parent).children(),
            None => &self.top_level_fields,
        };
        children
            .iter()
            .copied()
            .filter(|id| self.field(*id).result_key() == result_key)
            .collect()
    }

    /// Result keys from the top level down to `id`.
    pub fn list_of_result_keys(&self, id: FieldId) -> Vec<&str> {
        let mut keys = vec![];
        let mut current = Some(id);
        while let Some(id) = current {
            let field = self.field(id);
            keys.push(field.result_key());
            current = field.parent();
        }
        keys.reverse();
        keys
    }

    /// Visits every descendant of `id` in pre-order, `id` itself excluded.
    pub fn traverse_sub_tree(&self, id: FieldId, mut visit: impl FnMut(FieldId, &NormalizedField)) {
        self.traverse_levels(id, usize::MAX, &mut visit);
    }

    /// Descendants of `id` at most `relative_level` levels below it, in pre-order.
    ///
    /// # Panics
    /// If `relative_level` is 0.
    pub fn children_up_to_level(&self, id: FieldId, relative_level: usize) -> Vec<FieldId> {
        assert!(relative_level >= 1, "relative level must be >= 1");
        let mut result = vec![];
        self.traverse_levels(id, relative_level, &mut |child, _| result.push(child));
        result
    }

    fn traverse_levels(
        &self,
        id: FieldId,
        max_relative_level: usize,
        visit: &mut dyn FnMut(FieldId, &NormalizedField),
    ) {
        let mut stack: Vec<(FieldId, usize)> = self
            .field(id)
            .children()
            .iter()
            .rev()
            .map(|child| (*child, 1))
            .collect();

        while let Some((current, relative_level)) = stack.pop() {
            let field = self.field(current);
            visit(current, field);
            if relative_level < max_relative_level {
                stack.extend(
                    field
                        .children()
                        .iter()
                        .rev()
                        .map(|child| (*child, relative_level + 1)),
                );
            }
        }
    }

    /// Whether `id` only applies to some of the types its parent's selection set
    /// can return, so printing it needs a type condition.
    pub fn is_conditional(&self, id: FieldId, schema: &SchemaState) -> bool {
        let field = self.field(id);
        let Some(parent_id) = field.parent() else {
            return false;
        };
        let parent = self.field(parent_id);
        let parent_definitions = parent.field_definitions(schema);

        // interfaces every possible parent output type implements
        let mut shared_interfaces: Option<Vec<&str>> = None;
        for definition in &parent_definitions {
            let output_type = definition.field_type.inner_type();
            let mut interfaces: Vec<&str> = vec![];
            match schema.definition(output_type) {
                Some(TypeDefinition::Object(object)) => {
                    interfaces.extend(object.implements_interfaces.iter().map(String::as_str))
                }
                Some(TypeDefinition::Interface(interface)) => {
                    interfaces.push(interface.name.as_str());
                    interfaces.extend(interface.implements_interfaces.iter().map(String::as_str));
                }
                _ => {}
            }
            shared_interfaces = Some(match shared_interfaces {
                None => interfaces,
                Some(shared) => shared.into_iter().filter(|i| interfaces.contains(i)).collect(),
            });
        }

        let object_type_count = field.object_type_names().len();
        for interface in shared_interfaces.unwrap_or_default() {
            let implementations = schema.implementations(interface).len();
            if field.field_name() == TYPENAME_FIELD && implementations == object_type_count {
                return false;
            }
            if schema.field_definition(interface, field.field_name()).is_none() {
                continue;
            }
            if implementations == object_type_count {
                return false;
            }
        }

        let parent_output_type = parent.one_field_definition(schema).field_type.inner_type();
        if let Some(TypeDefinition::Union(union_type)) = schema.definition(parent_output_type) {
            if field.field_name() == TYPENAME_FIELD && union_type.types.len() == object_type_count {
                return false;
            }
        }

        if object_type_count > 1 || parent.object_type_names().len() > 1 {
            return true;
        }

        parent_output_type != field.single_object_type_name()
    }

    fn pretty_fmt_field(&self, f: &mut FmtFormatter<'_>, id: FieldId, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        let field = self.field(id);
        if !field.has_children() {
            return writeln!(f, "{indent}{field}");
        }
        writeln!(f, "{indent}{field} {{")?;
        for child in field.children() {
            self.pretty_fmt_field(f, *child, depth + 1)?;
        }
        writeln!(f, "{indent}}}")
    }
}

impl PrettyDisplay for NormalizedOperation {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        match &self.operation_name {
            Some(name) => writeln!(f, "{indent}{} {name} {{", self.operation_kind)?,
            None => writeln!(f, "{indent}{} {{", self.operation_kind)?,
        }
        for id in &self.top_level_fields {
            self.pretty_fmt_field(f, *id, depth + 1)?;
        }
        writeln!(f, "{indent}}}")
    }
}

impl Display for NormalizedOperation {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}
