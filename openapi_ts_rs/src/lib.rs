//! Generate TypeScript models from OpenAPI component schemas.
//!
//! Every schema under `components.schemas` becomes one file,
//! `models/<Name>.ts`, holding an `export interface <Name>Props`, a
//! `class <Name> implements <Name>Props` with read-only fields and a
//! destructuring constructor, and a default export of the class. Object
//! properties that `$ref` another schema are typed by that schema's interface
//! and imported from its sibling module.

mod catalog;
mod codegen;
mod error;
mod json_pointer;
mod schema;
mod settings;
mod sink;
mod validate;

pub use catalog::{Catalog, ObjectShape, Reference, SchemaKind, SchemaNode, SchemaSlot};
pub use codegen::{
    FILE_EXTENSION, GeneratedUnit, MODELS_DIR, SHAPE_SUFFIX, ShapeWarning, TypeMapper, UnitScope,
    emit_unit, generate, resolve_imports,
};
pub use error::{GenError, SchemaValidationError, SchemaValidationIssue, SchemaValidationIssueKind};
pub use schema::{ApiInfo, OpenApiDocument, parse_document};
pub use settings::{GenerateSettings, PropertyOrder};
pub use sink::{FileSink, MemorySink, Sink};

use std::path::Path;

/// Generate TypeScript models from an OpenAPI document (JSON or YAML text) and
/// hand each unit to `sink`.
///
/// The sink can be any type implementing `Sink`, such as `FileSink` or
/// `MemorySink`, enabling easy unit testing without file system interaction.
///
/// # Errors
///
/// Returns `GenError` if the document cannot be parsed, is not OpenAPI 3.x,
/// has an unresolved reference, fails the strict check when
/// `deny_unsupported_shapes` is set, or the sink fails to write a unit.
pub fn generate_to_sink<S: Sink + ?Sized>(
    document: &str,
    sink: &mut S,
    settings: &GenerateSettings,
) -> Result<(), GenError> {
    let document: OpenApiDocument = parse_document(document)?;
    if settings.deny_unsupported_shapes {
        validate::validate_document(&document)?;
    }
    let catalog: Catalog = Catalog::from_document(&document)?;
    generate(&catalog, sink, settings)
}

/// Generate TypeScript models from an OpenAPI file into `output_dir`.
///
/// Files are written to `output_dir/models/<Name>.ts`; directories are created
/// as needed.
///
/// # Errors
///
/// Returns `GenError` if reading the input file fails, or for any reason
/// listed on [`generate_to_sink`].
pub fn generate_from_file(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    settings: &GenerateSettings,
) -> Result<(), GenError> {
    let document: String = std::fs::read_to_string(input_path)?;
    let mut sink: FileSink = FileSink::new(output_dir);
    generate_to_sink(&document, &mut sink, settings)
}
