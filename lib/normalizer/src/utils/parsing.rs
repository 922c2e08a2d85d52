use crate::ast::Document;
use crate::schema::SchemaState;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse operation: {0}")]
    Operation(#[from] graphql_parser::query::ParseError),

    #[error("Failed to parse schema: {0}")]
    Schema(#[from] graphql_parser::schema::ParseError),
}

#[inline]
pub fn parse_schema(sdl: &str) -> SchemaState {
    safe_parse_schema(sdl).unwrap()
}

#[inline]
pub fn safe_parse_schema(sdl: &str) -> Result<SchemaState, ParseError> {
    let document = graphql_parser::parse_schema::<String>(sdl)?;
    Ok(SchemaState::new(&document))
}

#[inline]
pub fn parse_operation(operation: &str) -> Document {
    safe_parse_operation(operation).unwrap()
}

#[inline]
pub fn safe_parse_operation(operation: &str) -> Result<Document, ParseError> {
    let document = graphql_parser::parse_query::<String>(operation)?;
    Ok((&document).into())
}
