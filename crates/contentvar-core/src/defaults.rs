use serde_json::Value;
use tracing::trace;

use crate::error::{Result, ValidationError};
use crate::message::{MessageObject, scalar_matches};
use crate::model::{Children, Content, ContentVariable, Service, VariableType};

/// Fill schema defaults into the positions a message omits, returning the message.
pub fn default_missing_fields(mut msg: MessageObject, service: &Service) -> Result<MessageObject> {
    apply_defaults(&mut msg, service)?;
    Ok(msg)
}

/// In-place form of [`default_missing_fields`].
pub fn apply_defaults(msg: &mut MessageObject, service: &Service) -> Result<()> {
    apply_defaults_contents(msg, &service.outputs)
}

/// Fill defaults for an explicit list of contents.
///
/// A top-level variable that is absent receives its declared default as is,
/// without nested defaulting; one that declares no default is left absent.
/// Inserted defaults are copies, never shared with the schema.
pub fn apply_defaults_contents(msg: &mut MessageObject, contents: &[Content]) -> Result<()> {
    for content in contents {
        let variable = &content.content_variable;
        match msg.get_mut(&variable.name) {
            Some(value) => default_missing_field(value, variable)?,
            None => {
                if let Some(default) = &variable.value {
                    trace!(field = %variable.name, "inserting default");
                    msg.insert(variable.name.clone(), default.clone());
                }
            }
        }
    }
    Ok(())
}

/// Dispatches on the runtime shape of `value`, not on the declared type.
fn default_missing_field(value: &mut Value, variable: &ContentVariable) -> Result<()> {
    match value {
        Value::Object(object) if variable.variable_type == VariableType::Structure => {
            default_object(object, variable)
        }
        Value::Array(items) if variable.variable_type == VariableType::List => {
            default_list(items, variable)
        }
        // Nothing is synthesized below a present-but-null branch.
        Value::Null => Ok(()),
        other => {
            if scalar_matches(variable.variable_type, other) {
                Ok(())
            } else {
                Err(ValidationError::unexpected_type(variable, other))
            }
        }
    }
}

fn default_object(object: &mut MessageObject, variable: &ContentVariable) -> Result<()> {
    match &variable.children {
        Children::Wildcard(template) => {
            for value in object.values_mut() {
                default_missing_field(value, template)?;
            }
        }
        Children::Named(children) => {
            for child in children {
                match object.get_mut(&child.name) {
                    Some(value) => default_missing_field(value, child)?,
                    None => {
                        trace!(field = %child.name, "inserting default");
                        object.insert(child.name.clone(), child.default_value());
                    }
                }
            }
        }
    }
    Ok(())
}

/// Lists grow only by appending at the current end; gaps are never backfilled.
fn default_list(items: &mut Vec<Value>, variable: &ContentVariable) -> Result<()> {
    match &variable.children {
        Children::Wildcard(template) => {
            for item in items.iter_mut() {
                default_missing_field(item, template)?;
            }
        }
        Children::Named(children) => {
            for child in children {
                let index = child.list_index()?;
                if let Some(item) = items.get_mut(index) {
                    default_missing_field(item, child)?;
                } else if index == items.len() {
                    trace!(index, "appending default");
                    items.push(child.default_value());
                }
            }
        }
    }
    Ok(())
}
