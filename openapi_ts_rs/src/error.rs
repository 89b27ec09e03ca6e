use std::fmt;
use thiserror::Error;

/// Error type for OpenAPI to TypeScript generation.
#[derive(Debug, Error)]
pub enum GenError {
    /// The document is not valid JSON.
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not valid YAML.
    #[error("invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed but cannot be used as an OpenAPI 3.x input.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A `$ref` whose leaf name is not a schema in the catalog.
    #[error("unresolved reference '{reference}' at {location}")]
    UnresolvedReference {
        /// The reference string as written.
        reference: String,
        /// JSON Pointer of the node holding the reference.
        location: String,
    },

    /// Strict mode found shapes the generator can only approximate.
    #[error(transparent)]
    UnsupportedSchema(#[from] SchemaValidationError),

    /// I/O error while reading the input document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink could not persist a generated unit.
    #[error("failed to write '{path}': {source}")]
    SinkWrite {
        /// Relative path of the unit, e.g. `models/Pet.ts`.
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    /// True for errors caused by the input document rather than the environment.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::Json(_)
                | Self::Yaml(_)
                | Self::MalformedInput(_)
                | Self::UnresolvedReference { .. }
                | Self::UnsupportedSchema(_)
        )
    }
}

/// A single strict-mode issue: where it is and what is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationIssue {
    /// JSON Pointer to the offending node.
    pub path: String,
    pub kind: SchemaValidationIssueKind,
}

/// Shapes that generate only as permissive fallbacks, or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaValidationIssueKind {
    /// `type: array` with no `items`; would become `any[]`.
    ArrayMissingItems,
    /// Inline `type: object` at a property or item position; would become `Record<string, any>`.
    InlineObjectWithoutReference,
    /// `allOf` is not supported.
    UnsupportedKeywordAllOf,
    /// `oneOf` is not supported.
    UnsupportedKeywordOneOf,
    /// `anyOf` is not supported.
    UnsupportedKeywordAnyOf,
    /// `type` given as a list with other than one entry; would become `any`.
    TypeListNotSupported,
    /// No `type` or an unrecognised one at a property or item position; would become `any`.
    UntypedSchema,
}

impl fmt::Display for SchemaValidationIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message: &str = match self {
            Self::ArrayMissingItems => "array schema has no items",
            Self::InlineObjectWithoutReference => "inline object schema has no $ref",
            Self::UnsupportedKeywordAllOf => "allOf is not supported",
            Self::UnsupportedKeywordOneOf => "oneOf is not supported",
            Self::UnsupportedKeywordAnyOf => "anyOf is not supported",
            Self::TypeListNotSupported => "type lists are not supported",
            Self::UntypedSchema => "schema has no supported type",
        };
        f.write_str(message)
    }
}

/// All strict-mode issues found in a document, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    pub issues: Vec<SchemaValidationIssue>,
}

impl std::error::Error for SchemaValidationError {}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema has {} unsupported shape(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  {}: {}", issue.path, issue.kind)?;
        }
        Ok(())
    }
}
