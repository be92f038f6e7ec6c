use std::path::Path;

use contentvar_core::{MessageObject, Service};
use serde_json::Value;

use crate::CliError;

pub fn load_service(path: &Path) -> Result<Service, CliError> {
    let content = std::fs::read_to_string(path)?;
    let service: Service = serde_json::from_str(&content)?;
    tracing::debug!(
        event = "service_loaded",
        service = %service.id,
        outputs = service.outputs.len(),
        inputs = service.inputs.len()
    );
    Ok(service)
}

/// Messages must be JSON objects keyed by top-level variable name.
pub fn load_message(path: &Path) -> Result<MessageObject, CliError> {
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(object) => Ok(object),
        other => Err(CliError::InvalidInput(format!(
            "message in {} must be a JSON object, got {}",
            path.display(),
            contentvar_core::MessageKind::of(&other)
        ))),
    }
}
