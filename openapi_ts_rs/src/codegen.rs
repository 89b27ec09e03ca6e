use crate::catalog::{Catalog, Reference, SchemaKind, SchemaNode, SchemaSlot};
use crate::error::GenError;
use crate::json_pointer;
use crate::settings::GenerateSettings;
use crate::sink::Sink;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Suffix of every generated interface name: `Pet` -> `PetProps`.
pub const SHAPE_SUFFIX: &str = "Props";

/// Directory every unit is written under.
pub const MODELS_DIR: &str = "models";

/// Extension of generated files.
pub const FILE_EXTENSION: &str = "ts";

/// References followed within one type expression before falling back to
/// `any`. Only reachable through self-referencing array schemas.
const MAX_REFERENCE_DEPTH: usize = 32;

const INDENT: &str = "    ";

/// A shape the generator could only approximate with a permissive type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeWarning {
    /// `type: array` without `items`; emitted as `any[]`.
    ArrayWithoutItems { title: Option<String> },
    /// Object with no reference to name it; emitted as `Record<string, any>`.
    ObjectWithoutReference { title: Option<String> },
    /// Reference chain too deep to be anything but a cycle; emitted as `any`.
    NestingTooDeep { title: Option<String> },
    /// Reference whose leaf name is not in the catalog; emitted as `any`.
    UnresolvedReference { reference: String },
}

impl fmt::Display for ShapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrayWithoutItems { title } => write!(
                f,
                "Schema items are missing for '{}'",
                title.as_deref().unwrap_or_default()
            ),
            Self::ObjectWithoutReference { title } => write!(
                f,
                "Object schema '{}' has no reference to name it",
                title.as_deref().unwrap_or_default()
            ),
            Self::NestingTooDeep { title } => write!(
                f,
                "Array nesting too deep for '{}'",
                title.as_deref().unwrap_or_default()
            ),
            Self::UnresolvedReference { reference } => {
                write!(f, "Reference '{reference}' does not resolve")
            }
        }
    }
}

/// Facts collected while walking one schema: the schemas it references and
/// the fallbacks it needed. Scoped to a single unit, never shared.
#[derive(Debug, Default)]
pub struct UnitScope {
    used_refs: BTreeSet<String>,
    warnings: Vec<ShapeWarning>,
}

impl UnitScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn used_refs(&self) -> &BTreeSet<String> {
        &self.used_refs
    }

    #[must_use]
    pub fn warnings(&self) -> &[ShapeWarning] {
        &self.warnings
    }

    fn warn(&mut self, warning: ShapeWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Maps schema nodes to TypeScript type expressions.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    catalog: &'a Catalog,
}

impl<'a> TypeMapper<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Type expression for `node`, which was reached through `reference` if any.
    ///
    /// Referenced object schemas are recorded in `scope` and named by their
    /// interface (`<Leaf>Props`); primitives never touch `scope`.
    pub fn map_type(
        &self,
        node: &SchemaNode,
        reference: Option<&Reference>,
        scope: &mut UnitScope,
    ) -> String {
        self.map_type_at(node, reference, scope, 0)
    }

    /// Type expression for a property or item position, resolving references.
    pub fn map_slot(&self, slot: &SchemaSlot, scope: &mut UnitScope) -> String {
        self.map_slot_at(slot, scope, 0)
    }

    fn map_slot_at(&self, slot: &SchemaSlot, scope: &mut UnitScope, depth: usize) -> String {
        match slot {
            SchemaSlot::Inline(node) => self.map_type_at(node, None, scope, depth),
            SchemaSlot::Ref(reference) => match self.catalog.resolve(reference) {
                Some(target) if depth >= MAX_REFERENCE_DEPTH => {
                    scope.warn(ShapeWarning::NestingTooDeep {
                        title: target.title.clone(),
                    });
                    "any".to_string()
                }
                Some(target) => self.map_type_at(target, Some(reference), scope, depth + 1),
                None => {
                    scope.warn(ShapeWarning::UnresolvedReference {
                        reference: reference.as_str().to_string(),
                    });
                    "any".to_string()
                }
            },
        }
    }

    fn map_type_at(
        &self,
        node: &SchemaNode,
        reference: Option<&Reference>,
        scope: &mut UnitScope,
        depth: usize,
    ) -> String {
        match &node.kind {
            SchemaKind::String => "string".to_string(),
            SchemaKind::Number => "number".to_string(),
            SchemaKind::Boolean => "boolean".to_string(),
            SchemaKind::Array { items: Some(items) } => {
                let item_type: String = self.map_slot_at(items, scope, depth);
                format!("{item_type}[]")
            }
            SchemaKind::Array { items: None } => {
                scope.warn(ShapeWarning::ArrayWithoutItems {
                    title: node.title.clone(),
                });
                "any[]".to_string()
            }
            SchemaKind::Object(_) => match reference.filter(|r| !r.is_empty()) {
                Some(reference) => {
                    let ref_name: &str = reference.leaf();
                    scope.used_refs.insert(ref_name.to_string());
                    format!("{ref_name}{SHAPE_SUFFIX}")
                }
                None => {
                    scope.warn(ShapeWarning::ObjectWithoutReference {
                        title: node.title.clone(),
                    });
                    "Record<string, any>".to_string()
                }
            },
            SchemaKind::Null => "null".to_string(),
            SchemaKind::Unknown => "any".to_string(),
        }
    }
}

/// One import line per referenced schema, in the set's (sorted) order.
///
/// Only the leaf of each name matters, both for the imported interface and
/// for the sibling module path.
#[must_use]
pub fn resolve_imports(used_refs: &BTreeSet<String>) -> Vec<String> {
    used_refs
        .iter()
        .map(|name| {
            let leaf: &str = json_pointer::last_segment(name);
            format!("import {{ {leaf}{SHAPE_SUFFIX} }} from \"./{leaf}\";")
        })
        .collect()
}

/// A rendered field of the interface.
struct ShapeField<'a> {
    name: &'a str,
    optional: bool,
    type_expr: String,
}

/// The generated output for one schema. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    name: String,
    imports: Vec<String>,
    shape: String,
    value: String,
    warnings: Vec<ShapeWarning>,
}

impl GeneratedUnit {
    /// Schema name, also the class name and default export.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relative output path: `models/<Name>.ts`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{MODELS_DIR}/{}.{FILE_EXTENSION}", self.name)
    }

    #[must_use]
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// The `export interface <Name>Props { ... }` block.
    #[must_use]
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// The `class <Name> implements <Name>Props { ... }` block.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn warnings(&self) -> &[ShapeWarning] {
        &self.warnings
    }

    /// Full file text: imports, interface, class and default export separated
    /// by blank lines, with surrounding whitespace trimmed.
    #[must_use]
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::with_capacity(4);
        if !self.imports.is_empty() {
            sections.push(self.imports.join("\n"));
        }
        sections.push(self.shape.clone());
        sections.push(self.value.clone());
        sections.push(format!("export default {};", self.name));
        sections.join("\n\n").trim().to_string()
    }
}

/// Emit the interface and class for one schema.
///
/// Property names pass through unescaped; a name that is not a valid
/// TypeScript identifier produces invalid output.
#[must_use]
pub fn emit_unit(
    catalog: &Catalog,
    name: &str,
    node: &SchemaNode,
    settings: &GenerateSettings,
) -> GeneratedUnit {
    let shape_name: String = format!("{name}{SHAPE_SUFFIX}");
    let mapper: TypeMapper<'_> = TypeMapper::new(catalog);
    let mut scope: UnitScope = UnitScope::new();

    let fields: Vec<ShapeField<'_>> = node
        .shape()
        .map(|shape| {
            shape
                .properties_in(settings.property_order)
                .into_iter()
                .map(|(property, slot)| ShapeField {
                    name: property,
                    optional: !shape.is_required(property),
                    type_expr: mapper.map_slot(slot, &mut scope),
                })
                .collect()
        })
        .unwrap_or_default();

    let shape: String = render_shape(&shape_name, &fields);
    let value: String = render_value(name, &shape_name, &fields);
    // The unit's own interface is declared locally.
    scope.used_refs.remove(name);
    let imports: Vec<String> = resolve_imports(scope.used_refs());

    GeneratedUnit {
        name: name.to_string(),
        imports,
        shape,
        value,
        warnings: scope.warnings,
    }
}

fn render_shape(shape_name: &str, fields: &[ShapeField<'_>]) -> String {
    let mut out: String = format!("export interface {shape_name} {{\n");
    for field in fields {
        let marker: &str = if field.optional { "?" } else { "" };
        out.push_str(&format!(
            "{INDENT}{}{marker}: {};\n",
            field.name, field.type_expr
        ));
    }
    out.push('}');
    out
}

fn render_value(class_name: &str, shape_name: &str, fields: &[ShapeField<'_>]) -> String {
    let mut out: String = format!("class {class_name} implements {shape_name} {{\n");
    for field in fields {
        out.push_str(&format!(
            "{INDENT}readonly {name}: {shape_name}['{name}'];\n",
            name = field.name
        ));
    }
    if !fields.is_empty() {
        out.push('\n');
    }
    let params: Vec<&str> = fields.iter().map(|field| field.name).collect();
    out.push_str(&format!(
        "{INDENT}constructor({{{}}}: {shape_name}) {{\n",
        params.join(", ")
    ));
    for field in fields {
        out.push_str(&format!(
            "{INDENT}{INDENT}this.{name} = {name};\n",
            name = field.name
        ));
    }
    out.push_str(&format!("{INDENT}}}\n}}"));
    out
}

/// Emit every schema in `catalog` and hand each unit to `sink`.
///
/// Units are written in catalog order. The first failed write aborts the run;
/// units already written stay written.
///
/// # Errors
///
/// Returns `GenError::SinkWrite` if the sink rejects a unit.
pub fn generate<S: Sink + ?Sized>(
    catalog: &Catalog,
    sink: &mut S,
    settings: &GenerateSettings,
) -> Result<(), GenError> {
    info!(schemas = catalog.len(), "Starting code generation");
    if let Some(api) = catalog.info() {
        debug!(title = ?api.title, version = ?api.version, "API info");
    }

    for (name, node) in catalog.schemas() {
        debug!(schema = name, "Handling schema");
        let unit: GeneratedUnit = emit_unit(catalog, name, node, settings);
        let path: String = unit.path();
        sink.write(&path, &unit.render())
            .map_err(|source| GenError::SinkWrite { path, source })?;
    }

    info!("Code generation complete");
    Ok(())
}
