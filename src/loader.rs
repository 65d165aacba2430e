//! Specification loading
//!
//! Reads a JSON or YAML document from disk and hands back a `Document`
//! ready for transformation. External `$ref`s are not followed and the
//! document is not validated against the OpenAPI meta-schema; only the
//! version marker is checked.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::checksum::Checksum;
use crate::document::Document;
use crate::error::SpecLoadError;
use crate::version::SpecVersion;

/// A loaded document together with the digest of its raw bytes
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    pub document: Document,
    pub digest: Checksum,
    pub source: String,
}

/// Load and version-check a specification file
pub async fn load(path: impl AsRef<Path>) -> Result<Document, SpecLoadError> {
    Ok(load_with_digest(path).await?.document)
}

/// Like `load`, also returning the SHA-256 digest of the file contents
pub async fn load_with_digest(path: impl AsRef<Path>) -> Result<LoadedSpec, SpecLoadError> {
    let path = path.as_ref();
    let source = path.display().to_string();

    let bytes = tokio::fs::read(path).await.map_err(|e| SpecLoadError::Io {
        path: source.clone(),
        source: e,
    })?;
    let digest = Checksum::from_bytes(&bytes);
    debug!(path = %source, bytes = bytes.len(), digest = %digest, "read specification");

    let root = parse_bytes(path, &bytes)?;
    let document = document_from_root(&root)?;

    info!(
        path = %source,
        schemas = document.schemas.len(),
        paths = document.paths.len(),
        "loaded specification"
    );

    Ok(LoadedSpec { document, digest, source })
}

/// Parse a specification already held in memory
pub fn parse_str(content: &str) -> Result<Document, SpecLoadError> {
    let root = parse_text(None, content)?;
    document_from_root(&root)
}

fn parse_bytes(path: &Path, bytes: &[u8]) -> Result<Value, SpecLoadError> {
    let text = String::from_utf8_lossy(bytes);
    let extension = path.extension().and_then(|e| e.to_str());
    parse_text(extension, &text)
}

/// YAML extensions go straight to the YAML parser; anything else is tried
/// as JSON first, then YAML.
fn parse_text(extension: Option<&str>, text: &str) -> Result<Value, SpecLoadError> {
    match extension {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(text)?),
        Some("json") => Ok(serde_json::from_str(text)?),
        _ => match serde_json::from_str(text) {
            Ok(value) => Ok(value),
            Err(json_err) => {
                debug!(error = %json_err, "not JSON, trying YAML");
                Ok(serde_yaml::from_str(text)?)
            }
        },
    }
}

fn document_from_root(root: &Value) -> Result<Document, SpecLoadError> {
    let version = SpecVersion::detect(root).ok_or_else(|| {
        SpecLoadError::UnsupportedVersion("missing or unreadable swagger/openapi field".into())
    })?;
    if !version.is_supported() {
        return Err(SpecLoadError::UnsupportedVersion(version.to_string()));
    }
    Ok(Document::from_value(root)?)
}
