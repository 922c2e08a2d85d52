use std::fmt::Display;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value as JsonValue;

use crate::ast::{Argument, Field, TypeNode};
use crate::schema::introspection::{SCHEMA_FIELD, TYPENAME_FIELD, TYPE_FIELD};
use crate::schema::{FieldDefinition, SchemaState};
use crate::values::NormalizedInputValue;

/// Handle of a [`NormalizedField`] inside the operation that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub(crate) usize);

impl FieldId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// `(object type, field name)`, the schema coordinate of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCoordinates {
    pub type_name: String,
    pub field_name: String,
}

impl FieldCoordinates {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl Display for FieldCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// A `@defer` the field was collected under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeferExecution {
    pub label: Option<String>,
}

impl DeferExecution {
    pub fn new(label: Option<String>) -> Self {
        Self { label }
    }
}

/// One field as it is executed: a result key resolved for a fixed set of
/// concrete object types.
#[derive(Debug, Clone)]
pub struct NormalizedField {
    pub(crate) field_name: String,
    pub(crate) alias: Option<String>,
    pub(crate) object_type_names: IndexSet<String>,
    pub(crate) resolved_arguments: IndexMap<String, JsonValue>,
    pub(crate) normalized_arguments: IndexMap<String, NormalizedInputValue>,
    pub(crate) ast_arguments: Vec<Arc<Argument>>,
    pub(crate) children: Vec<FieldId>,
    pub(crate) parent: Option<FieldId>,
    pub(crate) level: usize,
    pub(crate) defer_executions: IndexSet<DeferExecution>,
}

impl NormalizedField {
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn result_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field_name)
    }

    /// Never empty.
    pub fn object_type_names(&self) -> &IndexSet<String> {
        &self.object_type_names
    }

    /// # Panics
    /// If the field spans more than one object type.
    pub fn single_object_type_name(&self) -> &str {
        assert_eq!(
            self.object_type_names.len(),
            1,
            "field '{}' spans more than one object type",
            self.field_name
        );
        &self.object_type_names[0]
    }

    pub fn resolved_arguments(&self) -> &IndexMap<String, JsonValue> {
        &self.resolved_arguments
    }

    pub fn resolved_argument(&self, name: &str) -> Option<&JsonValue> {
        self.resolved_arguments.get(name)
    }

    pub fn normalized_arguments(&self) -> &IndexMap<String, NormalizedInputValue> {
        &self.normalized_arguments
    }

    pub fn normalized_argument(&self, name: &str) -> Option<&NormalizedInputValue> {
        self.normalized_arguments.get(name)
    }

    pub fn ast_arguments(&self) -> &[Arc<Argument>] {
        &self.ast_arguments
    }

    pub fn children(&self) -> &[FieldId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn parent(&self) -> Option<FieldId> {
        self.parent
    }

    /// 1 for top level fields.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Empty unless every occurrence of the field was deferred.
    pub fn defer_executions(&self) -> &IndexSet<DeferExecution> {
        &self.defer_executions
    }

    pub fn is_introspection_field(&self) -> bool {
        matches!(
            self.field_name.as_str(),
            TYPENAME_FIELD | SCHEMA_FIELD | TYPE_FIELD
        )
    }

    /// The field's definition on each of its object types.
    ///
    /// # Panics
    /// If an object type does not define the field.
    pub fn field_definitions<'s>(&self, schema: &'s SchemaState) -> Vec<&'s FieldDefinition> {
        self.object_type_names
            .iter()
            .map(|type_name| field_definition(schema, type_name, &self.field_name))
            .collect()
    }

    pub fn one_field_definition<'s>(&self, schema: &'s SchemaState) -> &'s FieldDefinition {
        field_definition(schema, &self.object_type_names[0], &self.field_name)
    }

    /// The output type, shared by the field's definition on every object type.
    ///
    /// # Panics
    /// If the object types declare different output types.
    pub fn output_type<'s>(&self, schema: &'s SchemaState) -> &'s TypeNode {
        let definitions = self.field_definitions(schema);
        let output_type = &definitions[0].field_type;
        assert!(
            definitions.iter().all(|d| &d.field_type == output_type),
            "field '{}' has more than one output type",
            self.field_name
        );
        output_type
    }

    /// `[Dog, Cat]` or `Dog`.
    pub fn object_type_names_to_string(&self) -> String {
        match self.object_type_names.len() {
            1 => self.object_type_names[0].clone(),
            _ => format!(
                "[{}]",
                self.object_type_names
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    /// `alias: [Dog, Cat].name`
    pub fn print_details(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{alias}: {}.{}", self.object_type_names_to_string(), self.field_name),
            None => format!("{}.{}", self.object_type_names_to_string(), self.field_name),
        }
    }
}

fn field_definition<'s>(schema: &'s SchemaState, type_name: &str, field_name: &str) -> &'s FieldDefinition {
    schema
        .field_definition(type_name, field_name)
        .unwrap_or_else(|| panic!("type '{type_name}' has no field '{field_name}'"))
}

impl Display for NormalizedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.print_details())?;
        if !self.normalized_arguments.is_empty() {
            let arguments = self
                .normalized_arguments
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>();
            write!(f, "({})", arguments.join(", "))?;
        }
        for defer in &self.defer_executions {
            match &defer.label {
                Some(label) => write!(f, " @defer(label: \"{label}\")")?,
                None => write!(f, " @defer")?,
            }
        }
        Ok(())
    }
}

/// A field under construction, together with the AST fields it was built from.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedFieldBuilder {
    pub field: NormalizedField,
    pub ast_fields: Vec<Arc<Field>>,
}

/// Mutable field tree the factory and the merger work on, frozen into a
/// [`super::NormalizedOperation`] when done.
#[derive(Debug, Default)]
pub(crate) struct FieldArena {
    pub fields: Vec<NormalizedFieldBuilder>,
    pub top_level: Vec<FieldId>,
}

impl FieldArena {
    pub fn push(&mut self, builder: NormalizedFieldBuilder) -> FieldId {
        let id = FieldId(self.fields.len());
        match builder.field.parent {
            Some(parent) => self.get_mut(parent).field.children.push(id),
            None => self.top_level.push(id),
        }
        self.fields.push(builder);
        id
    }

    pub fn get(&self, id: FieldId) -> &NormalizedFieldBuilder {
        &self.fields[id.0]
    }

    pub fn get_mut(&mut self, id: FieldId) -> &mut NormalizedFieldBuilder {
        &mut self.fields[id.0]
    }

    /// Children of `parent`, or the top level fields.
    pub fn children_of(&self, parent: Option<FieldId>) -> &[FieldId] {
        match parent {
            Some(parent) => &self.get(parent).field.children,
            None => &self.top_level,
        }
    }

    pub fn children_of_mut(&mut self, parent: Option<FieldId>) -> &mut Vec<FieldId> {
        match parent {
            Some(parent) => &mut self.get_mut(parent).field.children,
            None => &mut self.top_level,
        }
    }
}
