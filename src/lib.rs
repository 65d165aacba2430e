//! OpenAPI Intermediate Representation
//!
//! Converts Swagger 2.x and OpenAPI 3.x documents into a normalized,
//! version-agnostic graph of types and operations for code generators.
//!
//! ## Features
//!
//! - **Stable Identifiers**: SHA256 ids derived from names, never from positions
//! - **Both Spec Families**: legacy (`swagger`) and modern (`openapi`) shapes
//! - **Closed Type Graph**: inline schemas are emitted as their own types
//! - **Deterministic Output**: same document in, byte-identical IR out
//!
//! ## Pipeline
//!
//! ```text
//! spec file ──load()──▶ Document ──transform()──▶ Ir ──serde──▶ JSON
//! ```
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = openapi_ir::load("petstore.yaml").await?;
//! let ir = openapi_ir::transform(&doc)?;
//! println!("{}", serde_json::to_string_pretty(&ir)?);
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod config;
pub mod document;
pub mod error;
pub mod ir;
pub mod loader;
pub mod naming;
pub mod refs;
pub mod transform;
pub mod version;

pub use checksum::{Checksum, IdHasher, Sha256Hasher};
pub use config::{IrConfig, OutputFormat};
pub use document::{Document, DocumentShape, Info};
pub use error::{IrError, Result, SpecLoadError};
pub use ir::{
    Body, HttpMethod, Inputs, Ir, IrOperation, IrType, Meta, Outputs, Response, SecurityScheme,
    Server, Service, Transport, TypeKind, TypeRef,
};
pub use loader::{load, load_with_digest, LoadedSpec};
pub use naming::to_camel_case;
pub use refs::resolve_ref;
pub use transform::{transform, TransformOptions, Transformer};
pub use version::{SpecFamily, SpecVersion};
