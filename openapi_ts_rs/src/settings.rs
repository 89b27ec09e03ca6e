//! Settings for OpenAPI to TypeScript generation.

/// Order of fields inside a generated interface and class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertyOrder {
    /// Alphabetical by property name, stable for any input.
    #[default]
    Sorted,
    /// The order properties appear in the document.
    Declared,
}

/// Settings that control code generation behavior.
#[derive(Debug, Clone, Default)]
pub struct GenerateSettings {
    /// Field order within each unit. Imports are always sorted by name.
    pub property_order: PropertyOrder,

    /// When true, fail before code generation if any schema contains a shape
    /// that would only generate as a permissive fallback (`any[]`,
    /// `Record<string, any>`, `any`) or uses a composition keyword or type list.
    /// Collects all issues and returns them together.
    ///
    /// **Default: false (disabled).** Such shapes are then logged as warnings
    /// and generation continues.
    pub deny_unsupported_shapes: bool,
}
