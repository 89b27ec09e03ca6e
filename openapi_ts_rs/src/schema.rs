use crate::error::GenError;
use indexmap::IndexMap;
use serde::Deserialize;

/// The parts of an OpenAPI document the generator reads.
///
/// Extra keys in the input are ignored via serde's default behavior.
/// Maps are `IndexMap` so document order survives parsing.
#[derive(Debug, Default, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default)]
    pub openapi: Option<VersionKeyword>,

    #[serde(default)]
    pub swagger: Option<VersionKeyword>,

    #[serde(default)]
    pub info: Option<ApiInfo>,

    #[serde(default)]
    pub components: Option<Components>,
}

/// `openapi: 3.1` is a YAML float while `openapi: 3.0.3` is a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VersionKeyword {
    Text(String),
    Number(f64),
}

impl VersionKeyword {
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, RawSchema>,
}

/// `type` is either a single name or (OpenAPI 3.1) a list of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeKeyword {
    Single(String),
    Many(Vec<String>),
}

impl TypeKeyword {
    /// The type name when exactly one is given.
    #[must_use]
    pub fn single(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name),
            Self::Many(names) if names.len() == 1 => names.first().map(String::as_str),
            Self::Many(_) => None,
        }
    }
}

/// One schema object as written in the document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSchema {
    #[serde(default, rename = "$ref")]
    pub reference: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub r#type: Option<TypeKeyword>,

    #[serde(default)]
    pub properties: Option<IndexMap<String, RawSchema>>,

    #[serde(default)]
    pub required: Option<Vec<String>>,

    #[serde(default)]
    pub items: Option<Box<RawSchema>>,

    #[serde(default, rename = "allOf")]
    pub all_of: Option<Vec<serde_json::Value>>,

    #[serde(default, rename = "oneOf")]
    pub one_of: Option<Vec<serde_json::Value>>,

    #[serde(default, rename = "anyOf")]
    pub any_of: Option<Vec<serde_json::Value>>,
}

/// Parse an OpenAPI 3.x document from JSON or YAML text.
///
/// Text whose first non-whitespace character is `{` is read as JSON; anything
/// else as YAML.
///
/// # Errors
///
/// Returns `GenError` if the text does not parse, the document is Swagger 2.x,
/// or its `openapi` version is missing or not `3.x`.
pub fn parse_document(text: &str) -> Result<OpenApiDocument, GenError> {
    let document: OpenApiDocument = if text.trim_start().starts_with('{') {
        serde_json::from_str(text)?
    } else {
        serde_yaml::from_str(text)?
    };

    if let Some(swagger) = &document.swagger {
        return Err(GenError::MalformedInput(format!(
            "Swagger {} documents are not supported (expected OpenAPI 3.x)",
            swagger.as_text()
        )));
    }
    let version: String = document
        .openapi
        .as_ref()
        .map(VersionKeyword::as_text)
        .ok_or_else(|| GenError::MalformedInput("missing \"openapi\" version".to_string()))?;
    if !version.starts_with("3.") && version != "3" {
        return Err(GenError::MalformedInput(format!(
            "OpenAPI version {version} not supported (expected 3.x)"
        )));
    }

    Ok(document)
}
