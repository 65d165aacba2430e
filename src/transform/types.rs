//! Schema classification and type emission

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{trace, warn};

use crate::checksum::IdHasher;
use crate::error::Result;
use crate::ir::{Constraints, IrType, TypeKind, TypeRef};
use crate::refs::{ref_of, resolve_ref};

/// Member discriminator for array items
const ITEMS_MEMBER: &str = "[]";
/// Member discriminator for map values
const VALUES_MEMBER: &str = "{}";

/// Classify a raw schema object.
///
/// Composition keywords win over `type`: `$ref` → ref, `allOf` →
/// intersection, `oneOf`/`anyOf` → union, `enum` → enum. Otherwise the
/// primitive `type` maps directly, and anything without a recognised
/// primitive type is an object, or a map when it only declares
/// `additionalProperties`.
pub fn classify(schema: &Value) -> TypeKind {
    if ref_of(schema).is_some() {
        return TypeKind::Ref;
    }
    if schema.get("allOf").is_some_and(Value::is_array) {
        return TypeKind::Intersection;
    }
    if schema.get("oneOf").is_some_and(Value::is_array)
        || schema.get("anyOf").is_some_and(Value::is_array)
    {
        return TypeKind::Union;
    }
    if schema.get("enum").is_some_and(Value::is_array) {
        return TypeKind::Enum;
    }

    match primary_type(schema).and_then(TypeKind::from_primitive) {
        Some(TypeKind::Object) | None => {
            let has_properties = schema.get("properties").is_some_and(Value::is_object);
            let has_value_schema = schema.get("additionalProperties").is_some_and(Value::is_object);
            if has_value_schema && !has_properties {
                TypeKind::Map
            } else {
                TypeKind::Object
            }
        }
        Some(kind) => kind,
    }
}

/// The `type` keyword, taking the first non-null entry of a type list
pub(crate) fn primary_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(list) => list
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

/// Whether the referencing site declares the value nullable
fn is_nullable(schema: &Value) -> bool {
    let flag = |key: &str| schema.get(key).and_then(Value::as_bool).unwrap_or(false);
    let in_type_list = schema
        .get("type")
        .and_then(Value::as_array)
        .is_some_and(|list| list.iter().any(|t| t.as_str() == Some("null")));
    flag("nullable") || flag("x-nullable") || in_type_list
}

/// Accumulates the `types` sequence of an IR, de-duplicated by id
pub(crate) struct TypeEmitter<'h, H> {
    hasher: &'h H,
    emit_inline: bool,
    types: Vec<IrType>,
    seen: HashSet<String>,
    /// Ids of named schemas; inline sites never claim these
    reserved: HashSet<String>,
}

impl<'h, H: IdHasher> TypeEmitter<'h, H> {
    pub fn new(hasher: &'h H, emit_inline: bool) -> Self {
        Self {
            hasher,
            emit_inline,
            types: Vec::new(),
            seen: HashSet::new(),
            reserved: HashSet::new(),
        }
    }

    /// Claim the id of a named schema before any schema is walked
    pub fn reserve_named(&mut self, name: &str) {
        let id = self.named_id(name);
        self.reserved.insert(id);
    }

    pub fn finish(self) -> Vec<IrType> {
        self.types
    }

    pub fn hasher(&self) -> &'h H {
        self.hasher
    }

    /// Id of a named schema
    pub fn named_id(&self, name: &str) -> String {
        self.hasher.id_of(&[name])
    }

    /// Emit a schema declared under definitions/components
    pub fn emit_named(&mut self, name: &str, schema: &Value) -> Result<()> {
        let id = self.named_id(name);
        if !self.seen.insert(id.clone()) {
            warn!(name, id = %id, "duplicate type id, keeping first declaration");
            return Ok(());
        }
        self.emit_at_slot(id, name.to_string(), schema)
    }

    /// Reference to the type a schema site denotes.
    ///
    /// `$ref` sites resolve to the named type and carry no nullability.
    /// Inline sites get the id `[owner, member, type]` and, when inline
    /// emission is on, their own `IrType` named `owner.member`.
    pub fn type_ref(&mut self, owner: &str, member: &str, schema: &Value) -> Result<TypeRef> {
        if let Some(reference) = ref_of(schema) {
            let name = resolve_ref(reference)?;
            return Ok(TypeRef::new(self.named_id(&name)));
        }

        let id = self
            .hasher
            .id(&[Some(owner), Some(member), primary_type(schema)]);
        let type_ref = TypeRef::new(id.clone()).nullable_if(is_nullable(schema));

        if self.reserved.contains(&id) {
            warn!(owner, member, id = %id, "inline type id collides with a named schema, keeping the named schema");
            return Ok(type_ref);
        }

        if self.emit_inline && self.seen.insert(id.clone()) {
            let name = format!("{}.{}", owner, member);
            trace!(name = %name, "emitting inline type");
            self.emit_at_slot(id, name, schema)?;
        }
        Ok(type_ref)
    }

    /// Build a type and place it ahead of the inline types it spawns
    fn emit_at_slot(&mut self, id: String, name: String, schema: &Value) -> Result<()> {
        let slot = self.types.len();
        let ty = self.build(id, name, schema)?;
        self.types.insert(slot, ty);
        Ok(())
    }

    fn build(&mut self, id: String, name: String, schema: &Value) -> Result<IrType> {
        let kind = classify(schema);
        let mut ty = IrType::new(id, name, kind);
        let owner = ty.name.clone();

        ty.description = str_field(schema, "description");
        ty.format = str_field(schema, "format");

        if let Some(reference) = ref_of(schema) {
            let target = resolve_ref(reference)?;
            ty.target = Some(TypeRef::new(self.named_id(&target)));
        }

        if let Some(props) = schema.get("properties").and_then(Value::as_object) {
            let mut properties = IndexMap::with_capacity(props.len());
            for (prop_name, prop_schema) in props {
                let prop_ref = self.type_ref(&owner, prop_name, prop_schema)?;
                properties.insert(prop_name.clone(), prop_ref);
            }
            ty.properties = Some(properties);
        }

        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            ty.required = Some(
                required
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            );
        }

        if kind == TypeKind::Array {
            if let Some(items) = schema.get("items").filter(|v| v.is_object()) {
                ty.items = Some(self.type_ref(&owner, ITEMS_MEMBER, items)?);
            }
        }

        if let Some(values) = schema.get("additionalProperties").filter(|v| v.is_object()) {
            ty.values = Some(self.type_ref(&owner, VALUES_MEMBER, values)?);
        }

        ty.all_of = self.members(&owner, schema, &["allOf"])?;
        ty.one_of = self.members(&owner, schema, &["oneOf", "anyOf"])?;

        if let Some(values) = schema.get("enum").and_then(Value::as_array) {
            ty.enum_values = Some(values.clone());
        }

        let constraints = Constraints {
            min_length: schema.get("minLength").and_then(Value::as_u64),
            max_length: schema.get("maxLength").and_then(Value::as_u64),
            minimum: schema.get("minimum").and_then(Value::as_f64),
            maximum: schema.get("maximum").and_then(Value::as_f64),
            pattern: str_field(schema, "pattern"),
        };
        if !constraints.is_empty() {
            ty.constraints = Some(constraints);
        }

        Ok(ty)
    }

    fn members(
        &mut self,
        owner: &str,
        schema: &Value,
        keywords: &[&str],
    ) -> Result<Option<Vec<TypeRef>>> {
        let mut refs = Vec::new();
        let mut found = false;
        for keyword in keywords {
            let Some(list) = schema.get(*keyword).and_then(Value::as_array) else {
                continue;
            };
            found = true;
            for (i, member) in list.iter().enumerate() {
                let member_name = format!("{}[{}]", keyword, i);
                refs.push(self.type_ref(owner, &member_name, member)?);
            }
        }
        Ok(found.then_some(refs))
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Sha256Hasher;
    use crate::error::IrError;
    use serde_json::json;

    fn emit(name: &str, schema: Value) -> Vec<IrType> {
        let mut emitter = TypeEmitter::new(&Sha256Hasher, true);
        emitter.emit_named(name, &schema).unwrap();
        emitter.finish()
    }

    #[test]
    fn test_primitive_classification() {
        assert_eq!(classify(&json!({"type": "string"})), TypeKind::String);
        assert_eq!(classify(&json!({"type": "integer"})), TypeKind::Integer);
        assert_eq!(classify(&json!({"type": "number"})), TypeKind::Number);
        assert_eq!(classify(&json!({"type": "boolean"})), TypeKind::Boolean);
        assert_eq!(classify(&json!({"type": "array"})), TypeKind::Array);
        assert_eq!(classify(&json!({"type": "null"})), TypeKind::Null);
    }

    #[test]
    fn test_object_default_classification() {
        assert_eq!(classify(&json!({})), TypeKind::Object);
        assert_eq!(classify(&json!({"properties": {"a": {}}})), TypeKind::Object);
        assert_eq!(classify(&json!({"type": "file"})), TypeKind::Object);
        assert_eq!(classify(&json!({"type": ["string", "null"]})), TypeKind::String);
    }

    #[test]
    fn test_composite_classification() {
        assert_eq!(classify(&json!({"$ref": "#/definitions/Pet"})), TypeKind::Ref);
        assert_eq!(classify(&json!({"allOf": [{}]})), TypeKind::Intersection);
        assert_eq!(classify(&json!({"oneOf": [{}]})), TypeKind::Union);
        assert_eq!(classify(&json!({"anyOf": [{}]})), TypeKind::Union);
        assert_eq!(classify(&json!({"type": "string", "enum": ["a"]})), TypeKind::Enum);
        assert_eq!(
            classify(&json!({"type": "object", "additionalProperties": {"type": "string"}})),
            TypeKind::Map
        );
        assert_eq!(
            classify(&json!({"additionalProperties": true})),
            TypeKind::Object
        );
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let types = emit(
            "Pet",
            json!({
                "type": "object",
                "properties": {
                    "zeta": {"type": "string"},
                    "alpha": {"type": "integer"},
                    "owner": {"$ref": "#/definitions/Person"}
                }
            }),
        );
        let pet = &types[0];
        let names: Vec<&str> = pet.properties.as_ref().unwrap().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "owner"]);
        assert_eq!(
            pet.properties.as_ref().unwrap()["owner"],
            TypeRef::new(Sha256Hasher.id_of(&["Person"]))
        );
        assert_eq!(
            pet.properties.as_ref().unwrap()["zeta"].type_id,
            Sha256Hasher.id_of(&["Pet", "zeta", "string"])
        );
    }

    #[test]
    fn test_required_fidelity() {
        let with = emit("A", json!({"required": ["a", "b"], "properties": {}}));
        assert_eq!(with[0].required, Some(vec!["a".to_string(), "b".to_string()]));

        let without = emit("B", json!({"properties": {}}));
        assert_eq!(without[0].required, None);
    }

    #[test]
    fn test_inline_types_emitted_after_owner() {
        let types = emit(
            "Pet",
            json!({
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "meta": {"properties": {"created": {"type": "string", "format": "date-time"}}}
                }
            }),
        );
        let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Pet", "Pet.name", "Pet.meta", "Pet.meta.created"]);

        let meta = &types[2];
        assert_eq!(meta.kind, TypeKind::Object);
        assert_eq!(meta.id, Sha256Hasher.id(&[Some("Pet"), Some("meta"), None]));
        assert_eq!(types[1].constraints.as_ref().unwrap().min_length, Some(1));
        assert_eq!(types[3].format.as_deref(), Some("date-time"));
    }

    #[test]
    fn test_inline_emission_can_be_disabled() {
        let mut emitter = TypeEmitter::new(&Sha256Hasher, false);
        emitter
            .emit_named("Pet", &json!({"properties": {"name": {"type": "string"}}}))
            .unwrap();
        let types = emitter.finish();
        assert_eq!(types.len(), 1);
        assert!(types[0].properties.as_ref().unwrap().contains_key("name"));
    }

    #[test]
    fn test_array_items() {
        let types = emit("Pets", json!({"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}));
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].items, Some(TypeRef::new(Sha256Hasher.id_of(&["Pet"]))));

        let types = emit("Tags", json!({"type": "array", "items": {"type": "string"}}));
        assert_eq!(types.len(), 2);
        assert_eq!(types[1].name, "Tags.[]");
        assert_eq!(types[0].items.as_ref().unwrap().type_id, types[1].id);
    }

    #[test]
    fn test_map_union_intersection_ref() {
        let types = emit("Labels", json!({"additionalProperties": {"type": "string"}}));
        assert_eq!(types[0].kind, TypeKind::Map);
        assert_eq!(types[0].values.as_ref().unwrap().type_id, types[1].id);

        let types = emit(
            "Shape",
            json!({"oneOf": [{"$ref": "#/definitions/Circle"}, {"type": "string"}]}),
        );
        assert_eq!(types[0].kind, TypeKind::Union);
        let members = types[0].one_of.as_ref().unwrap();
        assert_eq!(members[0].type_id, Sha256Hasher.id_of(&["Circle"]));
        assert_eq!(types[1].name, "Shape.oneOf[1]");

        let types = emit("Dog", json!({"allOf": [{"$ref": "#/definitions/Pet"}]}));
        assert_eq!(types[0].kind, TypeKind::Intersection);
        assert_eq!(types[0].all_of.as_ref().unwrap().len(), 1);

        let types = emit("Alias", json!({"$ref": "#/definitions/Pet"}));
        assert_eq!(types[0].kind, TypeKind::Ref);
        assert_eq!(types[0].target, Some(TypeRef::new(Sha256Hasher.id_of(&["Pet"]))));
    }

    #[test]
    fn test_enum_values_copied() {
        let types = emit("Status", json!({"type": "string", "enum": ["available", "sold"]}));
        assert_eq!(types[0].kind, TypeKind::Enum);
        assert_eq!(types[0].enum_values, Some(vec![json!("available"), json!("sold")]));
    }

    #[test]
    fn test_nullable_attached_to_reference() {
        let types = emit(
            "Pet",
            json!({"properties": {
                "nick": {"type": "string", "nullable": true},
                "age": {"type": ["integer", "null"]},
                "name": {"type": "string"}
            }}),
        );
        let props = types[0].properties.as_ref().unwrap();
        assert_eq!(props["nick"].nullable, Some(true));
        assert_eq!(props["age"].nullable, Some(true));
        assert_eq!(props["name"].nullable, None);
        // the type list still discriminates on the non-null entry
        assert_eq!(props["age"].type_id, Sha256Hasher.id_of(&["Pet", "age", "integer"]));
    }

    #[test]
    fn test_named_schema_wins_id_collision() {
        // "Pet" + "Tag" + "" hashes the same bytes as "PetTag"
        let mut emitter = TypeEmitter::new(&Sha256Hasher, true);
        emitter.reserve_named("Pet");
        emitter.reserve_named("PetTag");
        emitter
            .emit_named("Pet", &json!({"properties": {"Tag": {"properties": {"x": {"type": "string"}}}}}))
            .unwrap();
        emitter
            .emit_named("PetTag", &json!({"properties": {"y": {"type": "string"}}}))
            .unwrap();
        let types = emitter.finish();

        let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Pet", "PetTag", "PetTag.y"]);
        assert_eq!(types[1].id, Sha256Hasher.id_of(&["PetTag"]));
        assert_eq!(types[0].properties.as_ref().unwrap()["Tag"].type_id, types[1].id);
    }

    #[test]
    fn test_duplicate_inline_deduplicated() {
        let mut emitter = TypeEmitter::new(&Sha256Hasher, true);
        let first = emitter.type_ref("Op", "id", &json!({"type": "string"})).unwrap();
        let second = emitter.type_ref("Op", "id", &json!({"type": "string"})).unwrap();
        assert_eq!(first, second);
        assert_eq!(emitter.finish().len(), 1);
    }

    #[test]
    fn test_unsupported_property_reference() {
        let mut emitter = TypeEmitter::new(&Sha256Hasher, true);
        let err = emitter
            .emit_named("Pet", &json!({"properties": {"x": {"$ref": "http://external.example.com/schema.json"}}}))
            .unwrap_err();
        assert!(matches!(err, IrError::UnsupportedReferenceKind { .. }));
    }
}
