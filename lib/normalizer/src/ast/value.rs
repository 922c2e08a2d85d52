use std::fmt::Display;

use graphql_parser::query::{Text, Value as ParserValue};

/// A literal value as written in an operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(Vec<ObjectField>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub value: Value,
}

impl ObjectField {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl Value {
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Value::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn object_field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.value),
            _ => None,
        }
    }

    /// Structural equality where object fields are compared by name, ignoring their order.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(left), Value::List(right)) => {
                left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l.same_as(r))
            }
            (Value::Object(left), Value::Object(right)) => {
                left.len() == right.len()
                    && left.iter().all(|l| {
                        right
                            .iter()
                            .find(|r| r.name == l.name)
                            .is_some_and(|r| l.value.same_as(&r.value))
                    })
            }
            (left, right) => left == right,
        }
    }

    /// Collects every variable referenced by this value, in order of appearance.
    pub fn variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Value::Variable(name) => out.push(name),
            Value::List(items) => items.iter().for_each(|item| item.variables(out)),
            Value::Object(fields) => fields.iter().for_each(|f| f.value.variables(out)),
            _ => {}
        }
    }
}

impl<'a, T: Text<'a>> From<&ParserValue<'a, T>> for Value {
    fn from(value: &ParserValue<'a, T>) -> Self {
        match value {
            ParserValue::Variable(name) => Value::Variable(name.as_ref().to_string()),
            ParserValue::Int(i) => i.as_i64().map_or(Value::Null, Value::Int),
            ParserValue::Float(f) => Value::Float(*f),
            ParserValue::String(s) => Value::String(s.to_owned()),
            ParserValue::Boolean(b) => Value::Boolean(*b),
            ParserValue::Null => Value::Null,
            ParserValue::Enum(e) => Value::Enum(e.as_ref().to_string()),
            ParserValue::List(l) => Value::List(l.iter().map(Value::from).collect()),
            ParserValue::Object(o) => Value::Object(
                o.iter()
                    .map(|(k, v)| ObjectField::new(k.as_ref(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn write_escaped(f: &mut std::fmt::Formatter<'_>, s: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Variable(name) => write!(f, "${}", name),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => {
                let printed = v.to_string();
                if printed.contains(['.', 'e', 'E']) || !v.is_finite() {
                    write!(f, "{}", printed)
                } else {
                    write!(f, "{}.0", printed)
                }
            }
            Value::String(s) => write_escaped(f, s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Enum(e) => write!(f, "{}", e),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectField, Value};

    #[test]
    fn object_equality_ignores_field_order() {
        let a = Value::Object(vec![
            ObjectField::new("a", Value::Int(1)),
            ObjectField::new("b", Value::List(vec![Value::Boolean(true)])),
        ]);
        let b = Value::Object(vec![
            ObjectField::new("b", Value::List(vec![Value::Boolean(true)])),
            ObjectField::new("a", Value::Int(1)),
        ]);

        assert!(a.same_as(&b));
        assert_ne!(a, b);
        assert!(!a.same_as(&Value::Object(vec![ObjectField::new("a", Value::Int(1))])));
    }

    #[test]
    fn prints_literals() {
        let value = Value::Object(vec![
            ObjectField::new("f", Value::Float(2.0)),
            ObjectField::new("s", Value::String("a \"b\"\n".to_string())),
            ObjectField::new("l", Value::List(vec![Value::Enum("RED".into()), Value::Null])),
            ObjectField::new("v", Value::Variable("x".into())),
        ]);

        insta::assert_snapshot!(value.to_string(), @r#"{f: 2.0, s: "a \"b\"\n", l: [RED, null], v: $x}"#);
    }
}
