//! Document → IR transformation
//!
//! The transform is a single synchronous pass over an already resolved
//! `Document`. Named schemas are emitted first in declaration order, each
//! followed by the inline types nested inside it; operations come next, in
//! path order then method order, and may add inline types of their own.
//!
//! Identifiers are produced by an injected `IdHasher` so the pass stays
//! referentially transparent.

mod operations;
mod security;
mod service;
mod types;

pub use types::classify;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checksum::{IdHasher, Sha256Hasher};
use crate::document::Document;
use crate::error::Result;
use crate::ir::Ir;

use types::TypeEmitter;

/// Knobs for a transformation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Schemes used to synthesize legacy server URLs when none are declared
    #[serde(default = "default_schemes")]
    pub default_schemes: Vec<String>,

    /// Walk inline schemas and emit an `IrType` for each of them
    #[serde(default = "default_true")]
    pub emit_inline_types: bool,

    /// Populate operation inputs/outputs; when off they stay absent
    #[serde(default = "default_true")]
    pub map_operation_io: bool,
}

fn default_schemes() -> Vec<String> {
    vec!["http".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            default_schemes: default_schemes(),
            emit_inline_types: true,
            map_operation_io: true,
        }
    }
}

/// Converts documents into IR using an injected hasher
#[derive(Debug, Clone, Default)]
pub struct Transformer<H = Sha256Hasher> {
    hasher: H,
    options: TransformOptions,
}

impl Transformer<Sha256Hasher> {
    pub fn new(options: TransformOptions) -> Self {
        Self::with_hasher(Sha256Hasher, options)
    }
}

impl<H: IdHasher> Transformer<H> {
    pub fn with_hasher(hasher: H, options: TransformOptions) -> Self {
        Self { hasher, options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Run the full transformation. Fails on the first unsupported
    /// reference or missing required field; no partial IR is returned.
    pub fn transform(&self, doc: &Document) -> Result<Ir> {
        let service = service::resolve_service(doc)?;
        let servers = service::resolve_servers(doc, &self.options)?;

        let mut emitter = TypeEmitter::new(&self.hasher, self.options.emit_inline_types);
        for name in doc.schemas.keys() {
            emitter.reserve_named(name);
        }
        for (name, schema) in &doc.schemas {
            emitter.emit_named(name, schema)?;
        }

        let operations = operations::extract_operations(doc, &mut emitter, &self.options)?;
        let security_schemes = security::transform_security_schemes(doc, &self.hasher);
        let types = emitter.finish();

        debug!(
            service = %service.id,
            types = types.len(),
            operations = operations.len(),
            "transformed document"
        );

        Ok(Ir {
            service,
            servers,
            types,
            operations,
            security_schemes,
            meta: None,
        })
    }
}

/// Transform with the default SHA-256 hasher and default options
pub fn transform(doc: &Document) -> Result<Ir> {
    Transformer::new(TransformOptions::default()).transform(doc)
}
