//! The in-memory schema catalog the generator walks.
//!
//! Built from `components.schemas` of a parsed document. Every `$ref` in the
//! catalog is checked to resolve (by leaf name) when the catalog is built, so
//! the generator itself never has to fail on a dangling reference.

use crate::error::GenError;
use crate::json_pointer::{self, JsonPointer};
use crate::schema::{self, ApiInfo, OpenApiDocument, RawSchema};
use crate::settings::PropertyOrder;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::str::FromStr;

/// A `$ref` string. Only its final path segment identifies the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference(String);

impl Reference {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The referenced schema's name, e.g. `Pet` for `#/components/schemas/Pet`.
    #[must_use]
    pub fn leaf(&self) -> &str {
        json_pointer::last_segment(&self.0)
    }
}

/// A property or array-item position: either an inline schema or a reference.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSlot {
    Inline(SchemaNode),
    Ref(Reference),
}

impl SchemaSlot {
    #[must_use]
    pub fn reference(reference: impl Into<String>) -> Self {
        Self::Ref(Reference::new(reference))
    }

    fn from_raw(raw: &RawSchema) -> Self {
        match &raw.reference {
            Some(reference) => Self::Ref(Reference::new(reference.clone())),
            None => Self::Inline(SchemaNode::from_raw(raw)),
        }
    }
}

impl From<SchemaNode> for SchemaSlot {
    fn from(node: SchemaNode) -> Self {
        Self::Inline(node)
    }
}

/// Properties and required names of an object schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    properties: IndexMap<String, SchemaSlot>,
    required: BTreeSet<String>,
}

impl ObjectShape {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property; `required` marks it as present in the required list.
    #[must_use]
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        slot: impl Into<SchemaSlot>,
        required: bool,
    ) -> Self {
        let name: String = name.into();
        if required {
            self.required.insert(name.clone());
        }
        self.properties.insert(name, slot.into());
        self
    }

    /// Marks `name` as required whether or not it is a declared property.
    #[must_use]
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Properties in the requested order.
    #[must_use]
    pub fn properties_in(&self, order: PropertyOrder) -> Vec<(&str, &SchemaSlot)> {
        let mut properties: Vec<(&str, &SchemaSlot)> = self
            .properties
            .iter()
            .map(|(name, slot)| (name.as_str(), slot))
            .collect();
        if order == PropertyOrder::Sorted {
            properties.sort_by(|a, b| a.0.cmp(b.0));
        }
        properties
    }

    pub fn slots(&self) -> impl Iterator<Item = (&str, &SchemaSlot)> {
        self.properties
            .iter()
            .map(|(name, slot)| (name.as_str(), slot))
    }
}

/// The closed set of node kinds the type mapper understands.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String,
    /// `integer` and `number` alike.
    Number,
    Boolean,
    Array { items: Option<Box<SchemaSlot>> },
    Object(ObjectShape),
    Null,
    Unknown,
}

/// One schema definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Used only in diagnostics.
    pub title: Option<String>,
    pub kind: SchemaKind,
}

impl SchemaNode {
    #[must_use]
    pub fn new(kind: SchemaKind) -> Self {
        Self { title: None, kind }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn object(shape: ObjectShape) -> Self {
        Self::new(SchemaKind::Object(shape))
    }

    #[must_use]
    pub fn array_of(items: impl Into<SchemaSlot>) -> Self {
        Self::new(SchemaKind::Array {
            items: Some(Box::new(items.into())),
        })
    }

    /// The object shape, when this node is an object.
    #[must_use]
    pub fn shape(&self) -> Option<&ObjectShape> {
        match &self.kind {
            SchemaKind::Object(shape) => Some(shape),
            _ => None,
        }
    }

    fn from_raw(raw: &RawSchema) -> Self {
        let declared: Option<&str> = match &raw.r#type {
            Some(keyword) => match keyword.single() {
                Some(name) => Some(name),
                None => {
                    return Self {
                        title: raw.title.clone(),
                        kind: SchemaKind::Unknown,
                    };
                }
            },
            None => None,
        };
        let kind: SchemaKind = match declared {
            Some("string") => SchemaKind::String,
            Some("integer" | "number") => SchemaKind::Number,
            Some("boolean") => SchemaKind::Boolean,
            Some("array") => SchemaKind::Array {
                items: raw
                    .items
                    .as_deref()
                    .map(|items| Box::new(SchemaSlot::from_raw(items))),
            },
            Some("object") => SchemaKind::Object(object_shape_from_raw(raw)),
            None if raw.properties.is_some() => SchemaKind::Object(object_shape_from_raw(raw)),
            Some("null") => SchemaKind::Null,
            _ => SchemaKind::Unknown,
        };
        Self {
            title: raw.title.clone(),
            kind,
        }
    }
}

fn object_shape_from_raw(raw: &RawSchema) -> ObjectShape {
    let properties: IndexMap<String, SchemaSlot> = raw
        .properties
        .iter()
        .flatten()
        .map(|(name, property)| (name.clone(), SchemaSlot::from_raw(property)))
        .collect();
    let required: BTreeSet<String> = raw.required.iter().flatten().cloned().collect();
    ObjectShape {
        properties,
        required,
    }
}

/// Named schemas in declared order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    info: Option<ApiInfo>,
    schemas: IndexMap<String, SchemaNode>,
}

impl Catalog {
    /// Builds a catalog from already-constructed nodes.
    ///
    /// # Errors
    ///
    /// Returns `GenError::UnresolvedReference` if any reference's leaf name is
    /// not a key of `schemas`.
    pub fn from_schemas(schemas: IndexMap<String, SchemaNode>) -> Result<Self, GenError> {
        let catalog: Self = Self {
            info: None,
            schemas,
        };
        catalog.check_references()?;
        Ok(catalog)
    }

    /// Builds a catalog from `components.schemas` of a parsed document.
    ///
    /// Top-level aliases (`Name: { $ref: ... }`) become copies of the schema
    /// they name.
    ///
    /// # Errors
    ///
    /// Returns `GenError` if a reference does not resolve or aliases form a cycle.
    pub fn from_document(document: &OpenApiDocument) -> Result<Self, GenError> {
        let empty: IndexMap<String, RawSchema> = IndexMap::new();
        let raw: &IndexMap<String, RawSchema> = document
            .components
            .as_ref()
            .map_or(&empty, |components| &components.schemas);
        let root: JsonPointer = JsonPointer::root().child("components").child("schemas");

        let mut schemas: IndexMap<String, SchemaNode> = IndexMap::with_capacity(raw.len());
        for name in raw.keys() {
            let target: &RawSchema = resolve_alias(raw, name, &root)?;
            schemas.insert(name.clone(), SchemaNode::from_raw(target));
        }

        let catalog: Self = Self {
            info: document.info.clone(),
            schemas,
        };
        catalog.check_references()?;
        Ok(catalog)
    }

    #[must_use]
    pub fn info(&self) -> Option<&ApiInfo> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    /// Looks up the node a reference points at.
    #[must_use]
    pub fn resolve(&self, reference: &Reference) -> Option<&SchemaNode> {
        self.get(reference.leaf())
    }

    pub fn schemas(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.schemas.iter().map(|(name, node)| (name.as_str(), node))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn check_references(&self) -> Result<(), GenError> {
        let root: JsonPointer = JsonPointer::root().child("components").child("schemas");
        for (name, node) in &self.schemas {
            self.check_node(node, &root.child(name))?;
        }
        Ok(())
    }

    fn check_node(&self, node: &SchemaNode, path: &JsonPointer) -> Result<(), GenError> {
        match &node.kind {
            SchemaKind::Array { items: Some(items) } => self.check_slot(items, &path.child("items")),
            SchemaKind::Object(shape) => {
                let properties: JsonPointer = path.child("properties");
                for (name, slot) in shape.slots() {
                    self.check_slot(slot, &properties.child(name))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn check_slot(&self, slot: &SchemaSlot, path: &JsonPointer) -> Result<(), GenError> {
        match slot {
            SchemaSlot::Inline(node) => self.check_node(node, path),
            SchemaSlot::Ref(reference) if self.resolve(reference).is_some() => Ok(()),
            SchemaSlot::Ref(reference) => Err(GenError::UnresolvedReference {
                reference: reference.as_str().to_string(),
                location: path.to_string(),
            }),
        }
    }
}

impl FromStr for Catalog {
    type Err = GenError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let document: OpenApiDocument = schema::parse_document(text)?;
        Self::from_document(&document)
    }
}

/// Follows a chain of top-level `$ref` aliases to a concrete schema.
fn resolve_alias<'a>(
    raw: &'a IndexMap<String, RawSchema>,
    name: &str,
    root: &JsonPointer,
) -> Result<&'a RawSchema, GenError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut current_name: &str = name;
    let mut followed: &str = name;
    loop {
        let Some((key, current)) = raw.get_key_value(current_name) else {
            return Err(GenError::UnresolvedReference {
                reference: followed.to_string(),
                location: root.child(name).to_string(),
            });
        };
        let Some(reference) = &current.reference else {
            return Ok(current);
        };
        if !seen.insert(key.as_str()) {
            return Err(GenError::MalformedInput(format!(
                "schema alias cycle through '{name}'"
            )));
        }
        followed = reference;
        current_name = json_pointer::last_segment(reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(text: &str) -> Catalog {
        text.parse().expect("catalog should build")
    }

    #[test]
    fn reference_leaf_ignores_namespace() {
        let reference = Reference::new("#/components/schemas/Pet");
        assert_eq!("Pet", reference.leaf());
        assert!(!reference.is_empty());
        assert!(Reference::new("").is_empty());
    }

    #[test]
    fn kinds_are_mapped_from_type_keyword() {
        let catalog: Catalog = catalog(
            r"
openapi: 3.0.3
components:
  schemas:
    S: { type: string }
    I: { type: integer }
    N: { type: number }
    B: { type: boolean }
    Z: { type: 'null' }
    U: { type: file }
    L: { type: [string, 'null'] }
    One: { type: [boolean] }
    Bare: { description: nothing }
",
        );
        let kind = |name: &str| catalog.get(name).map(|n| n.kind.clone());
        assert_eq!(Some(SchemaKind::String), kind("S"));
        assert_eq!(Some(SchemaKind::Number), kind("I"));
        assert_eq!(Some(SchemaKind::Number), kind("N"));
        assert_eq!(Some(SchemaKind::Boolean), kind("B"));
        assert_eq!(Some(SchemaKind::Null), kind("Z"));
        assert_eq!(Some(SchemaKind::Unknown), kind("U"));
        assert_eq!(Some(SchemaKind::Unknown), kind("L"));
        assert_eq!(Some(SchemaKind::Boolean), kind("One"));
        assert_eq!(Some(SchemaKind::Unknown), kind("Bare"));
    }

    #[test]
    fn properties_without_type_make_an_object() {
        let catalog: Catalog = catalog(
            r"
openapi: 3.0.3
components:
  schemas:
    Implicit:
      required: [a]
      properties:
        a: { type: string }
",
        );
        let shape: &ObjectShape = catalog
            .get("Implicit")
            .and_then(SchemaNode::shape)
            .expect("implicit object");
        assert!(shape.is_required("a"));
    }

    #[test]
    fn property_references_become_ref_slots() {
        let catalog: Catalog = catalog(
            r"
openapi: 3.0.3
components:
  schemas:
    A:
      type: object
      properties:
        b: { $ref: '#/components/schemas/B' }
    B:
      type: object
      properties:
        x: { type: string }
",
        );
        let shape: &ObjectShape = catalog.get("A").and_then(SchemaNode::shape).expect("A");
        let slots: Vec<(&str, &SchemaSlot)> = shape.properties_in(PropertyOrder::Declared);
        assert_eq!(
            vec![("b", &SchemaSlot::reference("#/components/schemas/B"))],
            slots
        );
    }

    #[test]
    fn catalog_keeps_declared_order() {
        let catalog: Catalog = catalog(
            r"
openapi: 3.0.3
components:
  schemas:
    Zeta: { type: object }
    Alpha: { type: object }
    Mu: { type: object }
",
        );
        let names: Vec<&str> = catalog.schemas().map(|(name, _)| name).collect();
        assert_eq!(vec!["Zeta", "Alpha", "Mu"], names);
    }

    #[test]
    fn properties_sorted_or_declared() {
        let shape: ObjectShape = ObjectShape::new()
            .with_property("zeta", SchemaNode::new(SchemaKind::String), false)
            .with_property("alpha", SchemaNode::new(SchemaKind::String), true);
        let sorted: Vec<&str> = shape
            .properties_in(PropertyOrder::Sorted)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let declared: Vec<&str> = shape
            .properties_in(PropertyOrder::Declared)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(vec!["alpha", "zeta"], sorted);
        assert_eq!(vec!["zeta", "alpha"], declared);
    }

    #[test]
    fn unresolved_property_reference_is_reported_with_location() {
        let result: Result<Catalog, GenError> = r"
openapi: 3.0.3
components:
  schemas:
    A:
      type: object
      properties:
        tags:
          type: array
          items: { $ref: '#/components/schemas/Tag' }
"
        .parse();
        let Err(GenError::UnresolvedReference {
            reference,
            location,
        }) = result
        else {
            panic!("expected unresolved reference error");
        };
        assert_eq!("#/components/schemas/Tag", reference);
        assert_eq!("/components/schemas/A/properties/tags/items", location);
    }

    #[test]
    fn top_level_alias_copies_target() {
        let catalog: Catalog = catalog(
            r"
openapi: 3.0.3
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
    Animal:
      $ref: '#/components/schemas/Pet'
",
        );
        assert_eq!(catalog.get("Pet"), catalog.get("Animal"));
    }

    #[test]
    fn alias_cycle_is_malformed() {
        let result: Result<Catalog, GenError> = r"
openapi: 3.0.3
components:
  schemas:
    A: { $ref: '#/components/schemas/B' }
    B: { $ref: '#/components/schemas/A' }
"
        .parse();
        assert!(matches!(result, Err(GenError::MalformedInput(_))));
    }

    #[test]
    fn from_schemas_checks_references() {
        let mut schemas: IndexMap<String, SchemaNode> = IndexMap::new();
        schemas.insert(
            "A".to_string(),
            SchemaNode::object(ObjectShape::new().with_property(
                "b",
                SchemaSlot::reference("#/components/schemas/B"),
                true,
            )),
        );
        assert!(Catalog::from_schemas(schemas.clone()).is_err());

        schemas.insert("B".to_string(), SchemaNode::object(ObjectShape::new()));
        let catalog: Catalog = Catalog::from_schemas(schemas).expect("references resolve");
        assert_eq!(2, catalog.len());
        assert!(catalog.info().is_none());
    }

    #[test]
    fn document_without_components_is_empty() {
        let catalog: Catalog = catalog("openapi: 3.0.3\ninfo:\n  title: Empty\n  version: '1'\n");
        assert!(catalog.is_empty());
        assert_eq!(
            Some("Empty"),
            catalog.info().and_then(|info| info.title.as_deref())
        );
    }
}
