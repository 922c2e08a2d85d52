pub mod ast;
pub mod compiler;
pub mod config;
pub mod normalization;
pub mod schema;
pub mod utils;
pub mod values;
pub mod zipper;

#[cfg(test)]
mod tests;

pub use compiler::{compile_to_document, compile_to_document_with_defer_support, CompilerResult};
pub use config::NormalizerConfig;
pub use normalization::{
    normalize_document, normalize_operation, normalize_operation_with_raw_variables,
    NormalizationError, NormalizedOperation,
};
