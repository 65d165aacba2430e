//! Internal schema reference resolution

use std::borrow::Cow;

use crate::error::{IrError, Result};

const DEFINITIONS_PREFIX: &str = "#/definitions/";
const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Map a `$ref` string to the declared name of the schema it points at.
///
/// Only `#/definitions/<name>` and `#/components/schemas/<name>` are
/// understood. The target is not looked up, so a dangling reference still
/// resolves to a name.
pub fn resolve_ref(reference: &str) -> Result<Cow<'_, str>> {
    let name = reference
        .strip_prefix(DEFINITIONS_PREFIX)
        .or_else(|| reference.strip_prefix(COMPONENTS_PREFIX))
        .ok_or_else(|| IrError::unsupported_ref(reference))?;

    // A pointer into the interior of a schema has no declared name
    if name.is_empty() || name.contains('/') {
        return Err(IrError::unsupported_ref(reference));
    }

    if name.contains('~') {
        Ok(Cow::Owned(name.replace("~1", "/").replace("~0", "~")))
    } else {
        Ok(Cow::Borrowed(name))
    }
}

/// The `$ref` of a schema object, if it is one
pub fn ref_of(schema: &serde_json::Value) -> Option<&str> {
    schema.get("$ref").and_then(|v| v.as_str())
}
