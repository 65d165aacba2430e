//! In-memory specification document
//!
//! A `Document` is the shape-agnostic view the transformer walks. The only
//! part that differs between Swagger 2.x and OpenAPI 3.x in a way the
//! transformer cares about (server location) is carried by `DocumentShape`;
//! schemas, paths and security schemes are lifted into common fields here.

use serde_json::{Map, Value};

use crate::error::{IrError, Result};
use crate::version::{scalar_text, SpecVersion};

/// The `info` block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Version-specific capabilities of a document
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentShape {
    /// Swagger 2.x: servers are described by host, base path and schemes
    Legacy {
        host: Option<String>,
        base_path: Option<String>,
        schemes: Option<Vec<String>>,
    },
    /// OpenAPI 3.x: explicit server objects (`None` when `servers` is absent)
    Modern { servers: Option<Vec<Value>> },
}

/// A fully resolved specification document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub version: Option<SpecVersion>,
    pub info: Option<Info>,
    pub shape: DocumentShape,
    /// Named schemas (`definitions` or `components.schemas`) in declaration order
    pub schemas: Map<String, Value>,
    /// Path items in declaration order
    pub paths: Map<String, Value>,
    /// `securityDefinitions` or `components.securitySchemes`
    pub security_schemes: Map<String, Value>,
    /// Document-level `consumes` (legacy only)
    pub consumes: Option<Vec<String>>,
    /// Document-level `produces` (legacy only)
    pub produces: Option<Vec<String>>,
}

impl Document {
    /// Build a document from a parsed JSON/YAML tree.
    ///
    /// The shape follows the version marker; without one, a root carrying
    /// `servers` or `components` is treated as modern and anything else as
    /// legacy.
    pub fn from_value(root: &Value) -> Result<Self> {
        let obj = root
            .as_object()
            .ok_or_else(|| IrError::InvalidDocument("document root must be an object".into()))?;

        let version = SpecVersion::detect(root);
        let modern = match &version {
            Some(v) => !v.is_legacy(),
            None => obj.contains_key("servers") || obj.contains_key("components"),
        };

        let info = obj.get("info").map(|info| Info {
            title: scalar_field(info, "title"),
            version: scalar_field(info, "version"),
            description: str_field(info, "description"),
        });

        let shape = if modern {
            DocumentShape::Modern {
                servers: obj.get("servers").and_then(|v| v.as_array()).cloned(),
            }
        } else {
            DocumentShape::Legacy {
                host: str_field(root, "host"),
                base_path: str_field(root, "basePath"),
                schemes: string_list(root.get("schemes")),
            }
        };

        let components = obj.get("components");
        let schemas = if modern {
            object_at(components.and_then(|c| c.get("schemas")))
        } else {
            object_at(obj.get("definitions"))
        };
        let security_schemes = if modern {
            object_at(components.and_then(|c| c.get("securitySchemes")))
        } else {
            object_at(obj.get("securityDefinitions"))
        };

        Ok(Self {
            version,
            info,
            shape,
            schemas,
            paths: object_at(obj.get("paths")),
            security_schemes,
            consumes: string_list(obj.get("consumes")),
            produces: string_list(obj.get("produces")),
        })
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self.shape, DocumentShape::Legacy { .. })
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn scalar_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_text)
}

fn object_at(value: Option<&Value>) -> Map<String, Value> {
    value.and_then(|v| v.as_object()).cloned().unwrap_or_default()
}

pub(crate) fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}
