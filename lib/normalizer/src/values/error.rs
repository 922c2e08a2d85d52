/// Input that cannot be coerced to the type it is used at.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("Variable '${variable_name}' is non-nullable ('{type_name}') but no value was provided.")]
    NonNullVariable {
        variable_name: String,
        type_name: String,
    },

    #[error("Argument '{argument_name}' of field '{field_name}' is non-nullable ('{type_name}') but no value was provided.")]
    NonNullArgument {
        field_name: String,
        argument_name: String,
        type_name: String,
    },

    #[error("Value at '{path}' is non-nullable ('{type_name}') but is null or missing.")]
    NullValue { path: String, type_name: String },

    #[error("Value at '{path}' is not a valid '{type_name}': {reason}.")]
    InvalidValue {
        path: String,
        type_name: String,
        reason: String,
    },

    #[error("Field '{field_name}' at '{path}' is not defined by input type '{type_name}'.")]
    UnknownInputField {
        path: String,
        field_name: String,
        type_name: String,
    },

    #[error("Input type '{type_name}' not found.")]
    UnknownType { type_name: String },
}

impl CoercionError {
    pub(crate) fn invalid(path: &str, type_name: &str, reason: impl Into<String>) -> Self {
        CoercionError::InvalidValue {
            path: path.to_string(),
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn null(path: &str, type_name: impl ToString) -> Self {
        CoercionError::NullValue {
            path: path.to_string(),
            type_name: type_name.to_string(),
        }
    }
}
