//! Operation extraction from path items

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use super::types::TypeEmitter;
use super::TransformOptions;
use crate::checksum::IdHasher;
use crate::document::{string_list, Document};
use crate::error::{IrError, Result};
use crate::ir::{Body, HttpMethod, Inputs, IrOperation, Outputs, Response, Semantics, Transport, TypeRef};
use crate::refs::ref_of;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Emit one operation per (path, method) pair carrying an `operationId`,
/// in path order then key order.
pub(crate) fn extract_operations<H: IdHasher>(
    doc: &Document,
    emitter: &mut TypeEmitter<'_, H>,
    options: &TransformOptions,
) -> Result<Vec<IrOperation>> {
    let mut ops = Vec::new();

    for (path, path_item) in &doc.paths {
        let Some(item) = path_item.as_object() else {
            continue;
        };
        let shared_params = item.get("parameters");

        for (key, operation) in item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };

            let operation_id = operation
                .get("operationId")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty());
            let Some(operation_id) = operation_id else {
                debug!(path = %path, method = %method, "skipping operation without operationId");
                continue;
            };

            let (inputs, outputs) = if options.map_operation_io {
                let site = OperationSite { doc, operation_id, path, method, operation };
                (
                    Some(site.inputs(emitter, shared_params)?),
                    Some(site.outputs(emitter)?),
                )
            } else {
                (None, None)
            };

            let tags = string_list(operation.get("tags")).filter(|tags| !tags.is_empty());

            ops.push(IrOperation {
                id: emitter.hasher().id_of(&[operation_id]),
                name: operation_id.to_string(),
                summary: str_field(operation, "summary"),
                description: str_field(operation, "description"),
                transport: Transport::Http,
                method,
                path_template: path.clone(),
                tags,
                inputs,
                outputs,
                semantics: Semantics::from(method),
            });
        }
    }

    Ok(ops)
}

/// Everything needed to map one operation's parameters and responses
struct OperationSite<'a> {
    doc: &'a Document,
    operation_id: &'a str,
    path: &'a str,
    method: HttpMethod,
    operation: &'a Value,
}

impl<'a> OperationSite<'a> {
    fn field(&self, what: &str) -> String {
        format!("paths.{}.{}.{}", self.path, self.method.as_str().to_lowercase(), what)
    }

    /// Merge shared and operation parameters (operation wins per name and
    /// location) and group them by location.
    fn inputs<H: IdHasher>(
        &self,
        emitter: &mut TypeEmitter<'_, H>,
        shared_params: Option<&'a Value>,
    ) -> Result<Inputs> {
        let mut merged: IndexMap<(String, String), &Value> = IndexMap::new();
        for source in [shared_params, self.operation.get("parameters")].into_iter().flatten() {
            let Some(params) = source.as_array() else {
                continue;
            };
            for (i, param) in params.iter().enumerate() {
                if let Some(reference) = ref_of(param) {
                    return Err(IrError::unsupported_ref(reference));
                }
                let name = param
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| IrError::missing(self.field(&format!("parameters[{}].name", i))))?;
                let location = param
                    .get("in")
                    .and_then(Value::as_str)
                    .ok_or_else(|| IrError::missing(self.field(&format!("parameters[{}].in", i))))?;
                merged.insert((name.to_string(), location.to_string()), param);
            }
        }

        let mut inputs = Inputs::default();
        for ((name, location), param) in merged {
            if location == "body" {
                let schema = match param.get("schema") {
                    Some(schema) => Some(emitter.type_ref(self.operation_id, "body", schema)?),
                    None => None,
                };
                inputs.body = Some(Body {
                    content_types: self.legacy_media_types("consumes", DEFAULT_CONTENT_TYPE),
                    schema,
                    required: param.get("required").and_then(Value::as_bool).unwrap_or(false),
                });
                continue;
            }

            // Modern parameters wrap their schema, legacy ones are the schema
            let schema = param
                .get("schema")
                .or_else(|| first_content_schema(param.get("content")))
                .unwrap_or(param);
            let type_ref = emitter.type_ref(self.operation_id, &name, schema)?;

            let group = match location.as_str() {
                "path" => &mut inputs.path_params,
                "query" => &mut inputs.query_params,
                "header" => &mut inputs.headers,
                "cookie" => &mut inputs.cookies,
                "formData" => &mut inputs.form_params,
                other => {
                    debug!(operation = self.operation_id, location = other, "ignoring parameter location");
                    continue;
                }
            };
            group.insert(name, type_ref);
        }

        if let Some(request_body) = self.operation.get("requestBody") {
            if let Some(reference) = ref_of(request_body) {
                return Err(IrError::unsupported_ref(reference));
            }
            let content = request_body.get("content");
            let schema = match select_content_schema(content) {
                Some(schema) => Some(emitter.type_ref(self.operation_id, "body", schema)?),
                None => None,
            };
            inputs.body = Some(Body {
                content_types: content_types(content),
                schema,
                required: request_body.get("required").and_then(Value::as_bool).unwrap_or(false),
            });
        }

        Ok(inputs)
    }

    /// Map declared responses: 2xx keys are successes, everything else
    /// (including `default`) is an error response.
    fn outputs<H: IdHasher>(&self, emitter: &mut TypeEmitter<'_, H>) -> Result<Outputs> {
        let mut outputs = Outputs::default();
        let Some(responses) = self.operation.get("responses").and_then(Value::as_object) else {
            return Ok(outputs);
        };

        for (status, response) in responses {
            if let Some(reference) = ref_of(response) {
                return Err(IrError::unsupported_ref(reference));
            }

            let (content_types, schema) = if let Some(content) = response.get("content") {
                (content_types(Some(content)), select_content_schema(Some(content)))
            } else {
                let schema = response.get("schema");
                let content_types = if schema.is_some() {
                    self.legacy_media_types("produces", DEFAULT_CONTENT_TYPE)
                } else {
                    Vec::new()
                };
                (content_types, schema)
            };

            let schema = match schema {
                Some(schema) => Some(emitter.type_ref(self.operation_id, status, schema)?),
                None => None,
            };
            let response = Response {
                status: status.clone(),
                content_types,
                schema,
            };

            if status.starts_with('2') {
                outputs.success.push(response);
            } else {
                outputs.errors.push(response);
            }
        }

        Ok(outputs)
    }

    /// `consumes`/`produces` from the operation, then the document
    fn legacy_media_types(&self, key: &str, fallback: &str) -> Vec<String> {
        let document_level = match key {
            "consumes" => self.doc.consumes.clone(),
            _ => self.doc.produces.clone(),
        };
        string_list(self.operation.get(key))
            .or(document_level)
            .filter(|types| !types.is_empty())
            .unwrap_or_else(|| vec![fallback.to_string()])
    }
}

fn content_types(content: Option<&Value>) -> Vec<String> {
    content
        .and_then(Value::as_object)
        .map(|c| c.keys().cloned().collect())
        .unwrap_or_default()
}

/// Schema of `application/json` if it has one, else the first media type
/// that declares a schema
fn select_content_schema(content: Option<&Value>) -> Option<&Value> {
    let content = content.and_then(Value::as_object)?;
    content
        .get(DEFAULT_CONTENT_TYPE)
        .and_then(|media| media.get("schema"))
        .or_else(|| first_schema(content))
}

fn first_content_schema(content: Option<&Value>) -> Option<&Value> {
    first_schema(content.and_then(Value::as_object)?)
}

fn first_schema(content: &Map<String, Value>) -> Option<&Value> {
    content.values().find_map(|media| media.get("schema"))
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{IdHasher, Sha256Hasher};
    use serde_json::json;

    fn extract(root: Value) -> Result<Vec<IrOperation>> {
        let doc = Document::from_value(&root).unwrap();
        let mut emitter = TypeEmitter::new(&Sha256Hasher, true);
        extract_operations(&doc, &mut emitter, &TransformOptions::default())
    }

    #[test]
    fn test_methods_in_document_order() {
        let ops = extract(json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "post": {"operationId": "createPet"},
                    "parameters": [],
                    "get": {"operationId": "listPets", "tags": ["pets"]},
                    "x-internal": {"operationId": "ignored"},
                    "trace": {"operationId": "tracePets"}
                },
                "/pets/{petId}": {
                    "DELETE": {"operationId": "deletePet", "tags": []}
                }
            }
        }))
        .unwrap();

        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["createPet", "listPets", "deletePet"]);
        assert_eq!(ops[0].method, HttpMethod::Post);
        assert_eq!(ops[2].method, HttpMethod::Delete);
        assert_eq!(ops[2].path_template, "/pets/{petId}");
        assert_eq!(ops[1].tags, Some(vec!["pets".to_string()]));
        assert_eq!(ops[2].tags, None);
        assert_eq!(ops[0].tags, None);
        assert_eq!(ops[0].id, Sha256Hasher.id_of(&["createPet"]));
    }

    #[test]
    fn test_skips_operation_without_id() {
        let ops = extract(json!({
            "swagger": "2.0",
            "paths": {
                "/health": {"get": {"summary": "Health check"}},
                "/pets": {"get": {"operationId": "listPets", "summary": "List pets"}},
                "/empty": {"get": {"operationId": ""}}
            }
        }))
        .unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "listPets");
        assert_eq!(ops[0].summary.as_deref(), Some("List pets"));
    }

    #[test]
    fn test_modern_inputs_and_outputs() {
        let ops = extract(json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets/{petId}": {
                    "parameters": [
                        {"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}},
                        {"name": "verbose", "in": "query", "schema": {"type": "string"}}
                    ],
                    "put": {
                        "operationId": "updatePet",
                        "parameters": [
                            {"name": "verbose", "in": "query", "schema": {"type": "boolean"}},
                            {"name": "X-Trace", "in": "header", "schema": {"type": "string"}},
                            {"name": "session", "in": "cookie", "schema": {"type": "string"}}
                        ],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/xml": {"schema": {"type": "string"}},
                                "application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}
                            }
                        },
                        "responses": {
                            "200": {"description": "ok", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}},
                            "204": {"description": "no content"},
                            "default": {"description": "error", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Error"}}}}
                        }
                    }
                }
            }
        }))
        .unwrap();

        let op = &ops[0];
        assert_eq!(op.semantics, Semantics { safe: false, idempotent: true });
        let inputs = op.inputs.as_ref().unwrap();
        assert!(inputs.path_params.contains_key("petId"));
        assert_eq!(
            inputs.query_params["verbose"].type_id,
            Sha256Hasher.id_of(&["updatePet", "verbose", "boolean"])
        );
        assert!(inputs.headers.contains_key("X-Trace"));
        assert!(inputs.cookies.contains_key("session"));

        let body = inputs.body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(body.content_types, vec!["application/xml", "application/json"]);
        assert_eq!(body.schema, Some(TypeRef::new(Sha256Hasher.id_of(&["Pet"]))));

        let outputs = op.outputs.as_ref().unwrap();
        assert_eq!(outputs.success.len(), 2);
        assert_eq!(outputs.success[0].status, "200");
        assert_eq!(outputs.success[1].schema, None);
        assert!(outputs.success[1].content_types.is_empty());
        assert_eq!(outputs.errors[0].status, "default");
        assert_eq!(outputs.errors[0].schema, Some(TypeRef::new(Sha256Hasher.id_of(&["Error"]))));
    }

    #[test]
    fn test_legacy_body_and_produces() {
        let ops = extract(json!({
            "swagger": "2.0",
            "produces": ["application/json"],
            "paths": {
                "/pets": {
                    "post": {
                        "operationId": "addPet",
                        "consumes": ["application/xml"],
                        "parameters": [
                            {"name": "pet", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Pet"}},
                            {"name": "limit", "in": "query", "type": "integer", "format": "int32"}
                        ],
                        "responses": {
                            "201": {"description": "created", "schema": {"$ref": "#/definitions/Pet"}},
                            "405": {"description": "invalid input"}
                        }
                    }
                }
            }
        }))
        .unwrap();

        let inputs = ops[0].inputs.as_ref().unwrap();
        let body = inputs.body.as_ref().unwrap();
        assert_eq!(body.content_types, vec!["application/xml"]);
        assert_eq!(body.schema, Some(TypeRef::new(Sha256Hasher.id_of(&["Pet"]))));
        assert_eq!(
            inputs.query_params["limit"].type_id,
            Sha256Hasher.id_of(&["addPet", "limit", "integer"])
        );

        let outputs = ops[0].outputs.as_ref().unwrap();
        assert_eq!(outputs.success[0].content_types, vec!["application/json"]);
        assert_eq!(outputs.errors[0].status, "405");
        assert!(outputs.errors[0].content_types.is_empty());
    }

    #[test]
    fn test_io_left_absent_when_disabled() {
        let doc = Document::from_value(&json!({
            "openapi": "3.0.0",
            "paths": {"/pets": {"get": {"operationId": "listPets", "parameters": [{"name": "x", "in": "query"}]}}}
        }))
        .unwrap();
        let mut emitter = TypeEmitter::new(&Sha256Hasher, true);
        let options = TransformOptions { map_operation_io: false, ..TransformOptions::default() };
        let ops = extract_operations(&doc, &mut emitter, &options).unwrap();
        assert!(ops[0].inputs.is_none());
        assert!(ops[0].outputs.is_none());
        assert!(emitter.finish().is_empty());
    }

    #[test]
    fn test_parameter_reference_unsupported() {
        let err = extract(json!({
            "openapi": "3.0.0",
            "paths": {"/pets": {"get": {
                "operationId": "listPets",
                "parameters": [{"$ref": "#/components/parameters/limit"}]
            }}}
        }))
        .unwrap_err();
        assert!(matches!(err, IrError::UnsupportedReferenceKind { .. }));
    }

    #[test]
    fn test_parameter_without_name_fails() {
        let err = extract(json!({
            "openapi": "3.0.0",
            "paths": {"/pets": {"get": {"operationId": "listPets", "parameters": [{"in": "query"}]}}}
        }))
        .unwrap_err();
        match err {
            IrError::MissingRequiredField { field } => {
                assert_eq!(field, "paths./pets.get.parameters[0].name");
            }
            other => panic!("Expected MissingRequiredField, got {:?}", other),
        }
    }
}
