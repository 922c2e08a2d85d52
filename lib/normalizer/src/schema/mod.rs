use std::collections::HashMap;

use graphql_parser::query::Text;
use graphql_parser::schema as input;
use indexmap::{IndexMap, IndexSet};
use tracing::instrument;

use crate::ast::{OperationKind, TypeNode, Value};

pub mod introspection;

use introspection::{BUILTIN_SCALARS, INTROSPECTION_SDL, SCHEMA_FIELD, TYPENAME_FIELD, TYPE_FIELD};

#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub name: String,
    pub value_type: TypeNode,
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub arguments: IndexMap<String, InputValueDefinition>,
    pub field_type: TypeNode,
}

#[derive(Debug, Clone)]
pub struct ObjectTypeDefinition {
    pub name: String,
    pub implements_interfaces: Vec<String>,
    pub fields: IndexMap<String, FieldDefinition>,
}

#[derive(Debug, Clone)]
pub struct InterfaceTypeDefinition {
    pub name: String,
    pub implements_interfaces: Vec<String>,
    pub fields: IndexMap<String, FieldDefinition>,
}

#[derive(Debug, Clone)]
pub struct UnionTypeDefinition {
    pub name: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EnumTypeDefinition {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InputObjectTypeDefinition {
    pub name: String,
    pub fields: IndexMap<String, InputValueDefinition>,
}

#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Scalar(String),
    Object(ObjectTypeDefinition),
    Interface(InterfaceTypeDefinition),
    Union(UnionTypeDefinition),
    Enum(EnumTypeDefinition),
    InputObject(InputObjectTypeDefinition),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(name) => name,
            TypeDefinition::Object(o) => &o.name,
            TypeDefinition::Interface(i) => &i.name,
            TypeDefinition::Union(u) => &u.name,
            TypeDefinition::Enum(e) => &e.name,
            TypeDefinition::InputObject(i) => &i.name,
        }
    }

    pub fn fields(&self) -> Option<&IndexMap<String, FieldDefinition>> {
        match self {
            TypeDefinition::Object(o) => Some(&o.fields),
            TypeDefinition::Interface(i) => Some(&i.fields),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeDefinition::Object(_) | TypeDefinition::Interface(_) | TypeDefinition::Union(_)
        )
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeDefinition::Interface(_) | TypeDefinition::Union(_))
    }
}

fn convert_input_values<'a, T: Text<'a>>(
    values: &[input::InputValue<'a, T>],
) -> IndexMap<String, InputValueDefinition> {
    values
        .iter()
        .map(|v| {
            (
                v.name.as_ref().to_string(),
                InputValueDefinition {
                    name: v.name.as_ref().to_string(),
                    value_type: (&v.value_type).into(),
                    default_value: v.default_value.as_ref().map(Value::from),
                },
            )
        })
        .collect()
}

fn convert_fields<'a, T: Text<'a>>(
    fields: &[input::Field<'a, T>],
) -> IndexMap<String, FieldDefinition> {
    fields
        .iter()
        .map(|f| {
            (
                f.name.as_ref().to_string(),
                FieldDefinition {
                    name: f.name.as_ref().to_string(),
                    arguments: convert_input_values(&f.arguments),
                    field_type: (&f.field_type).into(),
                },
            )
        })
        .collect()
}

fn names<'a, T: Text<'a>>(values: &[T::Value]) -> Vec<String> {
    values.iter().map(|v| v.as_ref().to_string()).collect()
}

impl<'a, T: Text<'a>> From<&input::TypeDefinition<'a, T>> for TypeDefinition {
    fn from(definition: &input::TypeDefinition<'a, T>) -> Self {
        match definition {
            input::TypeDefinition::Scalar(s) => TypeDefinition::Scalar(s.name.as_ref().to_string()),
            input::TypeDefinition::Object(o) => TypeDefinition::Object(ObjectTypeDefinition {
                name: o.name.as_ref().to_string(),
                implements_interfaces: names::<T>(&o.implements_interfaces),
                fields: convert_fields(&o.fields),
            }),
            input::TypeDefinition::Interface(i) => {
                TypeDefinition::Interface(InterfaceTypeDefinition {
                    name: i.name.as_ref().to_string(),
                    implements_interfaces: names::<T>(&i.implements_interfaces),
                    fields: convert_fields(&i.fields),
                })
            }
            input::TypeDefinition::Union(u) => TypeDefinition::Union(UnionTypeDefinition {
                name: u.name.as_ref().to_string(),
                types: names::<T>(&u.types),
            }),
            input::TypeDefinition::Enum(e) => TypeDefinition::Enum(EnumTypeDefinition {
                name: e.name.as_ref().to_string(),
                values: e.values.iter().map(|v| v.name.as_ref().to_string()).collect(),
            }),
            input::TypeDefinition::InputObject(i) => {
                TypeDefinition::InputObject(InputObjectTypeDefinition {
                    name: i.name.as_ref().to_string(),
                    fields: convert_input_values(&i.fields),
                })
            }
        }
    }
}

/// The meta fields every schema answers, regardless of its own definitions.
#[derive(Debug)]
struct MetaFields {
    typename: FieldDefinition,
    schema: FieldDefinition,
    type_: FieldDefinition,
}

impl MetaFields {
    fn new() -> Self {
        let mut type_arguments = IndexMap::new();
        type_arguments.insert(
            "name".to_string(),
            InputValueDefinition {
                name: "name".to_string(),
                value_type: TypeNode::NonNull(Box::new(TypeNode::named("String"))),
                default_value: None,
            },
        );

        Self {
            typename: FieldDefinition {
                name: TYPENAME_FIELD.to_string(),
                arguments: IndexMap::new(),
                field_type: TypeNode::NonNull(Box::new(TypeNode::named("String"))),
            },
            schema: FieldDefinition {
                name: SCHEMA_FIELD.to_string(),
                arguments: IndexMap::new(),
                field_type: TypeNode::NonNull(Box::new(TypeNode::named("__Schema"))),
            },
            type_: FieldDefinition {
                name: TYPE_FIELD.to_string(),
                arguments: type_arguments,
                field_type: TypeNode::named("__Type"),
            },
        }
    }
}

/// Lookup structure over a schema document, the only view of the type system
/// the normalizer needs.
#[derive(Debug)]
pub struct SchemaState {
    /// A map of all type definitions (type_name, definition), including built-ins
    definitions: HashMap<String, TypeDefinition>,
    /// Object types implementing each interface, in declaration order
    implementations: HashMap<String, Vec<String>>,
    /// The root entrypoints
    pub query_type: String,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    meta_fields: MetaFields,
}

impl SchemaState {
    #[instrument(level = "trace", skip(schema), name = "new_schema_state")]
    pub fn new<'a, T: Text<'a>>(schema: &input::Document<'a, T>) -> Self {
        let mut definitions = HashMap::new();
        let mut query_type = None;
        let mut mutation_type = None;
        let mut subscription_type = None;
        let mut declaration_order = Vec::new();

        for definition in &schema.definitions {
            match definition {
                input::Definition::SchemaDefinition(schema_definition) => {
                    query_type = schema_definition.query.as_ref().map(|n| n.as_ref().to_string());
                    mutation_type = schema_definition
                        .mutation
                        .as_ref()
                        .map(|n| n.as_ref().to_string());
                    subscription_type = schema_definition
                        .subscription
                        .as_ref()
                        .map(|n| n.as_ref().to_string());
                }
                input::Definition::TypeDefinition(type_definition) => {
                    let converted = TypeDefinition::from(type_definition);
                    declaration_order.push(converted.name().to_string());
                    definitions.insert(converted.name().to_string(), converted);
                }
                input::Definition::TypeExtension(_) | input::Definition::DirectiveDefinition(_) => {}
            }
        }

        for scalar in BUILTIN_SCALARS {
            definitions
                .entry(scalar.to_string())
                .or_insert_with(|| TypeDefinition::Scalar(scalar.to_string()));
        }

        let introspection = graphql_parser::parse_schema::<String>(INTROSPECTION_SDL)
            .expect("introspection types are valid SDL");
        for definition in &introspection.definitions {
            if let input::Definition::TypeDefinition(type_definition) = definition {
                let converted = TypeDefinition::from(type_definition);
                definitions.insert(converted.name().to_string(), converted);
            }
        }

        let mut implementations: HashMap<String, Vec<String>> = HashMap::new();
        for type_name in &declaration_order {
            if let Some(TypeDefinition::Object(object)) = definitions.get(type_name) {
                for interface in &object.implements_interfaces {
                    implementations
                        .entry(interface.clone())
                        .or_default()
                        .push(object.name.clone());
                }
            }
        }

        let defined = |name: &str| definitions.contains_key(name).then(|| name.to_string());

        Self {
            query_type: query_type.unwrap_or_else(|| "Query".to_string()),
            mutation_type: mutation_type.or_else(|| defined("Mutation")),
            subscription_type: subscription_type.or_else(|| defined("Subscription")),
            definitions,
            implementations,
            meta_fields: MetaFields::new(),
        }
    }

    pub fn definition(&self, type_name: &str) -> Option<&TypeDefinition> {
        self.definitions.get(type_name)
    }

    pub fn is_object_type(&self, type_name: &str) -> bool {
        matches!(self.definition(type_name), Some(TypeDefinition::Object(_)))
    }

    pub fn root_type_name(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => Some(self.query_type.as_str()),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
        .filter(|name| self.is_object_type(name))
    }

    /// Object types implementing the interface, in declaration order.
    pub fn implementations(&self, interface_name: &str) -> &[String] {
        self.implementations
            .get(interface_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Interfaces directly implemented by an object or interface type.
    pub fn interfaces_of(&self, type_name: &str) -> &[String] {
        match self.definition(type_name) {
            Some(TypeDefinition::Object(o)) => &o.implements_interfaces,
            Some(TypeDefinition::Interface(i)) => &i.implements_interfaces,
            _ => &[],
        }
    }

    /// Concrete object types a value of `type_name` can have at runtime.
    pub fn possible_object_types(&self, type_name: &str) -> IndexSet<String> {
        match self.definition(type_name) {
            Some(TypeDefinition::Object(o)) => IndexSet::from([o.name.clone()]),
            Some(TypeDefinition::Interface(i)) => {
                self.implementations(&i.name).iter().cloned().collect()
            }
            Some(TypeDefinition::Union(u)) => u
                .types
                .iter()
                .filter(|t| self.is_object_type(t))
                .cloned()
                .collect(),
            _ => IndexSet::new(),
        }
    }

    /// Field lookup, including the `__typename`, `__schema` and `__type` meta fields.
    pub fn field_definition(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        let definition = self.definition(type_name)?;

        if field_name == TYPENAME_FIELD && definition.is_composite() {
            return Some(&self.meta_fields.typename);
        }

        if type_name == self.query_type {
            match field_name {
                SCHEMA_FIELD => return Some(&self.meta_fields.schema),
                TYPE_FIELD => return Some(&self.meta_fields.type_),
                _ => {}
            }
        }

        definition.fields()?.get(field_name)
    }
}
