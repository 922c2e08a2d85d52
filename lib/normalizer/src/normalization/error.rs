use crate::ast::OperationKind;
use crate::values::CoercionError;

#[derive(Debug, thiserror::Error)]
pub enum NormalizationError {
    #[error("Multiple operations found matching the criteria.")]
    MultipleMatchingOperationsFound,

    #[error("Specified operation '{operation_name}' not found.")]
    SpecifiedOperationNotFound { operation_name: String },

    #[error("An operation was expected, but none were present.")]
    OperationNotFound,

    #[error("Schema defines no root type for {operation_kind} operations.")]
    MissingRootType { operation_kind: OperationKind },

    #[error("Field '{field_name}' not found in type '{type_name}'.")]
    FieldNotFoundInType {
        field_name: String,
        type_name: String,
    },

    #[error("Maximum query depth exceeded. {depth} > {max_depth}")]
    MaxDepthExceeded { depth: usize, max_depth: usize },

    #[error("Maximum field count exceeded. {count} > {max_fields_count}")]
    MaxFieldsCountExceeded {
        count: usize,
        max_fields_count: usize,
    },

    #[error("Too many @skip/@include variables in operation. {count} > {max_skip_include_variables}")]
    TooManySkipIncludeVariables {
        count: usize,
        max_skip_include_variables: usize,
    },

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}
