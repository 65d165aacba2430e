//! Service descriptor and server resolution

use serde_json::Value;
use tracing::debug;

use super::TransformOptions;
use crate::document::{Document, DocumentShape};
use crate::error::{IrError, Result};
use crate::ir::{Server, Service};
use crate::naming::to_camel_case;

pub(crate) fn resolve_service(doc: &Document) -> Result<Service> {
    let info = doc.info.as_ref().ok_or_else(|| IrError::missing("info"))?;
    let title = info.title.clone().ok_or_else(|| IrError::missing("info.title"))?;
    let version = info.version.clone().ok_or_else(|| IrError::missing("info.version"))?;

    Ok(Service {
        id: to_camel_case(&title),
        title,
        version,
        description: info.description.clone(),
    })
}

/// Modern documents copy their server list; legacy documents synthesize one
/// URL per scheme from host and base path, or declare no servers at all
/// when there is no host.
pub(crate) fn resolve_servers(doc: &Document, options: &TransformOptions) -> Result<Option<Vec<Server>>> {
    match &doc.shape {
        DocumentShape::Modern { servers: None } => Ok(None),
        DocumentShape::Modern { servers: Some(servers) } => servers
            .iter()
            .enumerate()
            .map(|(i, server)| copy_server(i, server))
            .collect::<Result<Vec<_>>>()
            .map(Some),
        DocumentShape::Legacy { host: None, .. } => {
            debug!("legacy document declares no host, omitting servers");
            Ok(None)
        }
        DocumentShape::Legacy { host: Some(host), base_path, schemes } => {
            let schemes = schemes
                .as_ref()
                .filter(|s| !s.is_empty())
                .unwrap_or(&options.default_schemes);
            let base_path = base_path.as_deref().unwrap_or("");
            let servers = schemes
                .iter()
                .map(|scheme| Server {
                    url: format!("{}://{}{}", scheme, host, base_path),
                    variables: None,
                })
                .collect::<Vec<_>>();
            Ok((!servers.is_empty()).then_some(servers))
        }
    }
}

fn copy_server(index: usize, server: &Value) -> Result<Server> {
    let url = server
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| IrError::missing(format!("servers[{}].url", index)))?;
    Ok(Server {
        url: url.to_string(),
        variables: server.get("variables").and_then(Value::as_object).cloned(),
    })
}
