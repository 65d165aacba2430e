//! Security scheme normalization

use serde_json::Value;

use crate::checksum::IdHasher;
use crate::document::Document;
use crate::ir::{OAuthFlow, SecurityScheme};

/// Normalize declared security schemes; `None` when the document has none
pub(crate) fn transform_security_schemes<H: IdHasher>(
    doc: &Document,
    hasher: &H,
) -> Option<Vec<SecurityScheme>> {
    if doc.security_schemes.is_empty() {
        return None;
    }

    let schemes = doc
        .security_schemes
        .iter()
        .map(|(name, declared)| SecurityScheme {
            id: hasher.id_of(&[name.as_str()]),
            name: name.clone(),
            scheme_type: str_field(declared, "type"),
            location: str_field(declared, "in"),
            param_name: str_field(declared, "name"),
            scheme: str_field(declared, "scheme"),
            bearer_format: str_field(declared, "bearerFormat"),
            flows: flows(declared),
        })
        .collect();

    Some(schemes)
}

fn flows(declared: &Value) -> Vec<OAuthFlow> {
    // OpenAPI 3: a map of flow name -> flow object
    if let Some(flows) = declared.get("flows").and_then(Value::as_object) {
        return flows
            .iter()
            .map(|(flow_type, flow)| OAuthFlow {
                flow_type: flow_type.clone(),
                auth_url: str_field(flow, "authorizationUrl"),
                token_url: str_field(flow, "tokenUrl"),
                refresh_url: str_field(flow, "refreshUrl"),
                scopes: scopes(flow),
            })
            .collect();
    }

    // Swagger 2: a single flow described inline
    match str_field(declared, "flow") {
        Some(flow_type) => vec![OAuthFlow {
            flow_type,
            auth_url: str_field(declared, "authorizationUrl"),
            token_url: str_field(declared, "tokenUrl"),
            refresh_url: None,
            scopes: scopes(declared),
        }],
        None => Vec::new(),
    }
}

fn scopes(flow: &Value) -> Vec<String> {
    flow.get("scopes")
        .and_then(Value::as_object)
        .map(|s| s.keys().cloned().collect())
        .unwrap_or_default()
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}
