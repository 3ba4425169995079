//! Conversion engine: maps extracted table declarations to target models
//! and emits the target schema document.

pub mod assembler;
pub mod emitter;
pub mod engine;
pub mod errors;
pub mod mapper;
pub mod options;
pub mod repair;
pub mod report;

pub use assembler::{AssembledModel, ModelAssembler, audit_fields, inject_audit_fields};
pub use emitter::SchemaEmitter;
pub use engine::{Conversion, convert};
pub use errors::ConvertError;
pub use mapper::TypeMapper;
pub use options::{ConvertOptions, HeaderOptions, IdentityPolicy};
pub use repair::{Repair, repair_generated_schema};
pub use report::{ConversionReport, ModelSummary, UnmappedField, UnparsedIndex, render_summary};
