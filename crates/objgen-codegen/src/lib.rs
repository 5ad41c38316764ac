//! Code generators for objgen

pub mod error;
pub mod go;
pub mod outcome;

use objgen_core::EntityStore;

pub use error::{CodegenError, Diagnostic, Diagnostics, ErrorCategory, ErrorLocation};
pub use go::{GoCodegen, GoCodegenConfig};
pub use outcome::{EntitySummary, MemberOutcome, MemberReport, RunSummary, Totals};

/// Common trait for all code generators
pub trait Codegen {
    fn generate(&mut self, store: &EntityStore) -> Result<String, CodegenError>;
}
