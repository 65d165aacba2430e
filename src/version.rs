//! Specification version detection

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which family of the OpenAPI object model a document follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecFamily {
    /// Swagger 2.x (`swagger: "2.0"`)
    Swagger,
    /// OpenAPI 3.x (`openapi: "3.0.3"`)
    OpenApi,
}

/// Declared version of a specification document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecVersion {
    pub family: SpecFamily,
    /// Declared version, padded to full semver ("2.0" -> "2.0.0")
    pub version: Version,
}

impl SpecVersion {
    /// Detect the version marker of a document root.
    ///
    /// Returns `None` when neither `swagger` nor `openapi` is present or the
    /// value cannot be read as a version.
    pub fn detect(root: &Value) -> Option<Self> {
        if let Some(raw) = root.get("openapi") {
            return Self::parse(SpecFamily::OpenApi, &scalar_text(raw)?);
        }
        if let Some(raw) = root.get("swagger") {
            return Self::parse(SpecFamily::Swagger, &scalar_text(raw)?);
        }
        None
    }

    /// Parse a possibly partial version string
    pub fn parse(family: SpecFamily, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let raw = raw.strip_prefix('v').unwrap_or(raw);
        let padded = match raw.matches('.').count() {
            0 => format!("{}.0.0", raw),
            1 => format!("{}.0", raw),
            _ => raw.to_string(),
        };
        let version = Version::parse(&padded).ok()?;
        Some(Self { family, version })
    }

    /// Whether this crate understands the declared major version
    pub fn is_supported(&self) -> bool {
        matches!(
            (self.family, self.version.major),
            (SpecFamily::Swagger, 2) | (SpecFamily::OpenApi, 3)
        )
    }

    /// Whether the document uses the legacy (v2) shape
    pub fn is_legacy(&self) -> bool {
        self.family == SpecFamily::Swagger
    }
}

/// Unquoted YAML scalars (`swagger: 2.0`) arrive as numbers
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            SpecFamily::Swagger => write!(f, "swagger {}", self.version),
            SpecFamily::OpenApi => write!(f, "openapi {}", self.version),
        }
    }
}
