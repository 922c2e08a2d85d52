use std::fmt::Display;

use graphql_parser::query::{Text, Type};

/// A reference to a type as written in an operation or schema, e.g. `[Int!]!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    List(Box<TypeNode>),
    NonNull(Box<TypeNode>),
    Named(String),
}

impl TypeNode {
    pub fn named(name: impl Into<String>) -> Self {
        TypeNode::Named(name.into())
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeNode::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeNode::List(_) => true,
            TypeNode::NonNull(inner) => inner.as_ref().is_list(),
            TypeNode::Named(_) => false,
        }
    }

    /// Strips every list and non-null wrapper.
    pub fn inner_type(&self) -> &str {
        match self {
            TypeNode::List(inner) => inner.as_ref().inner_type(),
            TypeNode::NonNull(inner) => inner.as_ref().inner_type(),
            TypeNode::Named(name) => name,
        }
    }

    /// Strips a single non-null wrapper, if present.
    pub fn nullable(&self) -> &TypeNode {
        match self {
            TypeNode::NonNull(inner) => inner.as_ref(),
            other => other,
        }
    }
}

impl Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::List(inner) => write!(f, "[{}]", inner),
            TypeNode::NonNull(inner) => write!(f, "{}!", inner),
            TypeNode::Named(name) => write!(f, "{}", name),
        }
    }
}

impl<'a, T: Text<'a>> From<&Type<'a, T>> for TypeNode {
    fn from(input_type: &Type<'a, T>) -> Self {
        match input_type {
            Type::ListType(inner) => TypeNode::List(Box::new(inner.as_ref().into())),
            Type::NonNullType(inner) => TypeNode::NonNull(Box::new(inner.as_ref().into())),
            Type::NamedType(name) => TypeNode::Named(name.as_ref().to_string()),
        }
    }
}

impl TryFrom<&str> for TypeNode {
    type Error = &'static str;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();

        if s.is_empty() {
            return Err("Input string for type parsing cannot be empty.");
        }

        if let Some(inner) = s.strip_suffix('!') {
            return Ok(TypeNode::NonNull(Box::new(TypeNode::try_from(inner)?)));
        }

        if let Some(inner) = s.strip_prefix('[') {
            return match inner.strip_suffix(']') {
                Some(inner_content) => Ok(TypeNode::List(Box::new(TypeNode::try_from(
                    inner_content,
                )?))),
                None => Err("Mismatched brackets in list type"),
            };
        }

        if s.contains(['[', ']', '!']) {
            return Err("Invalid named type format");
        }

        Ok(TypeNode::Named(s.to_string()))
    }
}
