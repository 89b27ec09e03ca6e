//! Schema checks for `deny_unsupported_shapes` mode.
//!
//! Walks the parsed document and collects every shape the generator would
//! only approximate, without stopping at the first one.

use crate::error::{SchemaValidationError, SchemaValidationIssue, SchemaValidationIssueKind};
use crate::json_pointer::JsonPointer;
use crate::schema::{OpenApiDocument, RawSchema};

/// Validates every schema under `components.schemas`. Returns `Ok(())` if no
/// issues, or `Err(SchemaValidationError)` with all collected issues.
///
/// # Errors
///
/// Returns `SchemaValidationError` listing each unsupported shape with its
/// JSON Pointer.
pub fn validate_document(document: &OpenApiDocument) -> Result<(), SchemaValidationError> {
    let mut issues: Vec<SchemaValidationIssue> = Vec::new();
    let root: JsonPointer = JsonPointer::root().child("components").child("schemas");

    if let Some(components) = &document.components {
        for (name, schema) in &components.schemas {
            let path: JsonPointer = root.child(name);
            if schema.reference.is_some() {
                continue;
            }
            collect_keyword_issues(schema, &path, &mut issues);
            for (property, slot) in schema.properties.iter().flatten() {
                collect_slot_issues(
                    slot,
                    &path.child("properties").child(property),
                    &mut issues,
                );
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(SchemaValidationError { issues })
    }
}

fn push_issue(
    issues: &mut Vec<SchemaValidationIssue>,
    path: &JsonPointer,
    kind: SchemaValidationIssueKind,
) {
    issues.push(SchemaValidationIssue {
        path: path.to_string(),
        kind,
    });
}

/// Composition keywords and type lists, wherever they appear. Returns true if
/// any were found.
fn collect_keyword_issues(
    schema: &RawSchema,
    path: &JsonPointer,
    issues: &mut Vec<SchemaValidationIssue>,
) -> bool {
    let before: usize = issues.len();
    let keywords: [(bool, &str, SchemaValidationIssueKind); 3] = [
        (
            schema.all_of.is_some(),
            "allOf",
            SchemaValidationIssueKind::UnsupportedKeywordAllOf,
        ),
        (
            schema.one_of.is_some(),
            "oneOf",
            SchemaValidationIssueKind::UnsupportedKeywordOneOf,
        ),
        (
            schema.any_of.is_some(),
            "anyOf",
            SchemaValidationIssueKind::UnsupportedKeywordAnyOf,
        ),
    ];
    for (present, keyword, kind) in keywords {
        if present {
            push_issue(issues, &path.child(keyword), kind);
        }
    }
    if let Some(keyword) = &schema.r#type
        && keyword.single().is_none()
    {
        push_issue(
            issues,
            &path.child("type"),
            SchemaValidationIssueKind::TypeListNotSupported,
        );
    }
    issues.len() > before
}

/// A property or item position. References are always fine; inline objects,
/// item-less arrays and untyped schemas are not.
fn collect_slot_issues(
    slot: &RawSchema,
    path: &JsonPointer,
    issues: &mut Vec<SchemaValidationIssue>,
) {
    if slot.reference.is_some() || collect_keyword_issues(slot, path, issues) {
        return;
    }
    let declared: Option<&str> = slot.r#type.as_ref().and_then(|t| t.single());
    let kind: SchemaValidationIssueKind = match declared {
        Some("string" | "integer" | "number" | "boolean" | "null") => return,
        Some("array") => match &slot.items {
            Some(items) => return collect_slot_issues(items, &path.child("items"), issues),
            None => SchemaValidationIssueKind::ArrayMissingItems,
        },
        Some("object") => SchemaValidationIssueKind::InlineObjectWithoutReference,
        None if slot.properties.is_some() => {
            SchemaValidationIssueKind::InlineObjectWithoutReference
        }
        _ => SchemaValidationIssueKind::UntypedSchema,
    };
    push_issue(issues, path, kind);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_document;

    fn issues(text: &str) -> Vec<SchemaValidationIssue> {
        let document: OpenApiDocument = parse_document(text).expect("document should parse");
        validate_document(&document)
            .err()
            .map(|error| error.issues)
            .unwrap_or_default()
    }

    #[test]
    fn referenced_and_primitive_properties_pass() {
        let actual: Vec<SchemaValidationIssue> = issues(
            r"
openapi: 3.0.3
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
        owner: { $ref: '#/components/schemas/Owner' }
        friends:
          type: array
          items: { $ref: '#/components/schemas/Pet' }
    Owner:
      type: object
",
        );
        assert!(actual.is_empty(), "unexpected issues: {actual:?}");
    }

    #[test]
    fn array_missing_items() {
        let actual: Vec<SchemaValidationIssue> = issues(
            r"
openapi: 3.0.3
components:
  schemas:
    Post:
      type: object
      properties:
        tags: { type: array }
",
        );
        assert_eq!(
            vec![SchemaValidationIssue {
                path: "/components/schemas/Post/properties/tags".to_string(),
                kind: SchemaValidationIssueKind::ArrayMissingItems,
            }],
            actual
        );
    }

    #[test]
    fn top_level_array_has_no_fields_to_check() {
        let actual: Vec<SchemaValidationIssue> = issues(
            r"
openapi: 3.0.3
components:
  schemas:
    Tags: { type: array }
    Names:
      type: array
      items: { type: object }
",
        );
        assert!(actual.is_empty(), "unexpected issues: {actual:?}");
    }

    #[test]
    fn untyped_and_unknown_typed_properties() {
        let actual: Vec<SchemaValidationIssue> = issues(
            r"
openapi: 3.0.3
components:
  schemas:
    Post:
      type: object
      properties:
        extra: { description: free-form }
        blob: { type: file }
        flags:
          type: array
          items: {}
        nothing: { type: 'null' }
",
        );
        assert_eq!(
            vec![
                SchemaValidationIssue {
                    path: "/components/schemas/Post/properties/extra".to_string(),
                    kind: SchemaValidationIssueKind::UntypedSchema,
                },
                SchemaValidationIssue {
                    path: "/components/schemas/Post/properties/blob".to_string(),
                    kind: SchemaValidationIssueKind::UntypedSchema,
                },
                SchemaValidationIssue {
                    path: "/components/schemas/Post/properties/flags/items".to_string(),
                    kind: SchemaValidationIssueKind::UntypedSchema,
                },
            ],
            actual
        );
    }

    #[test]
    fn inline_object_property_and_nested_item() {
        let actual: Vec<SchemaValidationIssue> = issues(
            r"
openapi: 3.0.3
components:
  schemas:
    Order:
      type: object
      properties:
        address:
          type: object
          properties:
            street: { type: string }
        lines:
          type: array
          items:
            properties:
              sku: { type: string }
",
        );
        let paths: Vec<&str> = actual.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            vec![
                "/components/schemas/Order/properties/address",
                "/components/schemas/Order/properties/lines/items",
            ],
            paths
        );
        assert!(actual.iter().all(|i| matches!(
            i.kind,
            SchemaValidationIssueKind::InlineObjectWithoutReference
        )));
    }

    #[test]
    fn composition_keywords_and_type_lists_are_collected_together() {
        let actual: Vec<SchemaValidationIssue> = issues(
            r"
openapi: 3.1.0
components:
  schemas:
    Shape:
      oneOf:
        - $ref: '#/components/schemas/Circle'
      allOf: []
    Circle:
      type: object
      properties:
        radius: { type: [number, 'null'] }
        label: { anyOf: [{ type: string }] }
",
        );
        let kinds: Vec<&SchemaValidationIssueKind> = actual.iter().map(|i| &i.kind).collect();
        assert_eq!(
            vec![
                &SchemaValidationIssueKind::UnsupportedKeywordAllOf,
                &SchemaValidationIssueKind::UnsupportedKeywordOneOf,
                &SchemaValidationIssueKind::TypeListNotSupported,
                &SchemaValidationIssueKind::UnsupportedKeywordAnyOf,
            ],
            kinds
        );
        assert_eq!("/components/schemas/Shape/allOf", actual[0].path);
        assert_eq!(
            "/components/schemas/Circle/properties/radius/type",
            actual[2].path
        );
    }

    #[test]
    fn aliases_are_not_checked() {
        let actual: Vec<SchemaValidationIssue> = issues(
            r"
openapi: 3.0.3
components:
  schemas:
    Alias: { $ref: '#/components/schemas/Pet' }
    Pet: { type: object }
",
        );
        assert!(actual.is_empty());
    }
}
