//! Intermediate representation types
//!
//! Everything here serializes to camelCase JSON. Optional fields are
//! omitted rather than emitted as empty values: an absent `required` means
//! "none declared", which is not the same as an empty list.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::checksum::Checksum;

/// Version of the IR format produced by this crate
pub const IR_VERSION: &str = "0.1.0";

/// Root of the transformation output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ir {
    pub service: Service,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    pub types: Vec<IrType>,
    pub operations: Vec<IrOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<Vec<SecurityScheme>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Ir {
    /// Attach provenance metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Find a type by id
    pub fn type_by_id(&self, id: &str) -> Option<&IrType> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Find a type by declared name
    pub fn type_by_name(&self, name: &str) -> Option<&IrType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Find an operation by its declared name
    pub fn operation(&self, name: &str) -> Option<&IrOperation> {
        self.operations.iter().find(|o| o.name == name)
    }

    /// Every type id referenced from types or operations
    pub fn referenced_type_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for ty in &self.types {
            ty.collect_refs(&mut ids);
        }
        for op in &self.operations {
            op.collect_refs(&mut ids);
        }
        ids
    }
}

/// Provenance of an IR document. Never produced by the transformer itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub ir_version: String,
    pub spec_digest: Checksum,
    pub source: String,
    pub generated_at: DateTime<Utc>,
}

impl Meta {
    pub fn new(spec_digest: Checksum, source: impl Into<String>) -> Self {
        Self {
            ir_version: IR_VERSION.to_string(),
            spec_digest,
            source: source.into(),
            generated_at: Utc::now(),
        }
    }
}

/// Service descriptor derived from the info block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Base URL candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
}

// =============================================================================
// Types
// =============================================================================

/// Classification of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Union,
    Intersection,
    Enum,
    Map,
    Ref,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Object => "object",
            TypeKind::Array => "array",
            TypeKind::String => "string",
            TypeKind::Number => "number",
            TypeKind::Integer => "integer",
            TypeKind::Boolean => "boolean",
            TypeKind::Null => "null",
            TypeKind::Union => "union",
            TypeKind::Intersection => "intersection",
            TypeKind::Enum => "enum",
            TypeKind::Map => "map",
            TypeKind::Ref => "ref",
        }
    }

    /// Map a primitive `type` keyword; unknown keywords yield `None`
    pub fn from_primitive(keyword: &str) -> Option<Self> {
        match keyword {
            "object" => Some(TypeKind::Object),
            "array" => Some(TypeKind::Array),
            "string" => Some(TypeKind::String),
            "number" => Some(TypeKind::Number),
            "integer" => Some(TypeKind::Integer),
            "boolean" => Some(TypeKind::Boolean),
            "null" => Some(TypeKind::Null),
            _ => None,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-owning reference to an `IrType`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub type_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl TypeRef {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self { type_id: type_id.into(), nullable: None }
    }

    /// Mark the reference nullable when `nullable` is true
    pub fn nullable_if(mut self, nullable: bool) -> Self {
        if nullable {
            self.nullable = Some(true);
        }
        self
    }
}

/// Validation constraints carried over from the schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A normalized type declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrType {
    pub id: String,
    pub name: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, TypeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<TypeRef>,
    /// Value type of a `map`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<TypeRef>,
    /// Aliased type of a `ref`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TypeRef>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<TypeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<TypeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

impl IrType {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            description: None,
            format: None,
            properties: None,
            required: None,
            items: None,
            values: None,
            target: None,
            enum_values: None,
            all_of: None,
            one_of: None,
            constraints: None,
        }
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        let singles = [&self.items, &self.values, &self.target];
        out.extend(singles.into_iter().flatten().map(|r| r.type_id.as_str()));
        if let Some(props) = &self.properties {
            out.extend(props.values().map(|r| r.type_id.as_str()));
        }
        for members in [&self.all_of, &self.one_of].into_iter().flatten() {
            out.extend(members.iter().map(|r| r.type_id.as_str()));
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Transport an operation is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Http,
}

/// Standard HTTP verbs recognised under a path item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// Case-insensitive lookup of a path item key
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Safe methods do not modify server state
    pub fn is_safe(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head | HttpMethod::Options)
    }

    pub fn is_idempotent(&self) -> bool {
        self.is_safe() || matches!(self, HttpMethod::Put | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub content_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TypeRef>,
    pub required: bool,
}

/// Parameters and body of an operation, grouped by location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inputs {
    pub path_params: IndexMap<String, TypeRef>,
    pub query_params: IndexMap<String, TypeRef>,
    pub headers: IndexMap<String, TypeRef>,
    pub cookies: IndexMap<String, TypeRef>,
    /// Legacy `formData` parameters
    pub form_params: IndexMap<String, TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

/// A single declared response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Status key as declared ("200", "4XX", "default")
    pub status: String,
    pub content_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TypeRef>,
}

/// Declared responses, split into 2xx and everything else
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    pub success: Vec<Response>,
    pub errors: Vec<Response>,
}

/// Behavioural hints derived from the method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semantics {
    pub safe: bool,
    pub idempotent: bool,
}

impl From<HttpMethod> for Semantics {
    fn from(method: HttpMethod) -> Self {
        Self {
            safe: method.is_safe(),
            idempotent: method.is_idempotent(),
        }
    }
}

/// A normalized callable action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrOperation {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transport: Transport,
    pub method: HttpMethod,
    pub path_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// `None` means the inputs were not analyzed, not that there are none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Inputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Outputs>,
    pub semantics: Semantics,
}

impl IrOperation {
    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(inputs) = &self.inputs {
            let groups = [
                &inputs.path_params,
                &inputs.query_params,
                &inputs.headers,
                &inputs.cookies,
                &inputs.form_params,
            ];
            for group in groups {
                out.extend(group.values().map(|r| r.type_id.as_str()));
            }
            if let Some(schema) = inputs.body.as_ref().and_then(|b| b.schema.as_ref()) {
                out.push(&schema.type_id);
            }
        }
        if let Some(outputs) = &self.outputs {
            for response in outputs.success.iter().chain(&outputs.errors) {
                if let Some(schema) = &response.schema {
                    out.push(&schema.type_id);
                }
            }
        }
    }
}

// =============================================================================
// Security
// =============================================================================

/// A single OAuth2 flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(rename = "type")]
    pub flow_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    pub scopes: Vec<String>,
}

/// A declared security scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Header/query/cookie name for `apiKey` schemes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<OAuthFlow>,
}
