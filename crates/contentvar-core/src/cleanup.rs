use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::message::{MessageObject, scalar_matches};
use crate::model::{Children, Content, ContentVariable, Service, VariableType};

/// Strip fields the service outputs do not declare, type-checking the fields kept.
pub fn remove_unknown_fields(msg: MessageObject, service: &Service) -> Result<MessageObject> {
    remove_unknown_fields_contents(msg, &service.outputs)
}

/// Strip unknown fields against an explicit list of contents.
pub fn remove_unknown_fields_contents(
    msg: MessageObject,
    contents: &[Content],
) -> Result<MessageObject> {
    let mut retained = MessageObject::new();
    for (key, value) in msg {
        let variable = contents
            .iter()
            .map(|content| &content.content_variable)
            .find(|variable| variable.name == key);
        match variable {
            Some(variable) => {
                let value = clean_segment(value, variable)?;
                retained.insert(key, value);
            }
            None => debug!(field = %key, "dropping unknown field"),
        }
    }
    Ok(retained)
}

fn clean_segment(value: Value, variable: &ContentVariable) -> Result<Value> {
    match value {
        Value::Object(object) if variable.variable_type == VariableType::Structure => {
            clean_object(object, variable).map(Value::Object)
        }
        Value::Array(items) if variable.variable_type == VariableType::List => {
            clean_list(items, variable).map(Value::Array)
        }
        // Null falls through here as well: the cleaner has no missing-field policy.
        other if scalar_matches(variable.variable_type, &other) => Ok(other),
        other => Err(ValidationError::unexpected_type(variable, &other)),
    }
}

fn clean_object(object: MessageObject, variable: &ContentVariable) -> Result<MessageObject> {
    let mut retained = MessageObject::new();
    for (key, value) in object {
        let child = match &variable.children {
            Children::Wildcard(template) => Some(template.as_ref()),
            Children::Named(_) => variable.child(&key),
        };
        match child {
            Some(child) => {
                let value = clean_segment(value, child)?;
                retained.insert(key, value);
            }
            None => debug!(parent = %variable.name, field = %key, "dropping unknown field"),
        }
    }
    Ok(retained)
}

/// Unlike objects, lists are cut at the first element without a schema child.
fn clean_list(items: Vec<Value>, variable: &ContentVariable) -> Result<Vec<Value>> {
    let children = match &variable.children {
        Children::Wildcard(template) => {
            return items
                .into_iter()
                .map(|item| clean_segment(item, template))
                .collect();
        }
        Children::Named(children) => children,
    };

    let indexed = children
        .iter()
        .map(|child| child.list_index().map(|index| (index, child)))
        .collect::<Result<Vec<_>>>()?;

    let total = items.len();
    let mut retained = Vec::with_capacity(total.min(children.len()));
    for (index, item) in items.into_iter().enumerate() {
        let child = indexed
            .iter()
            .find_map(|(position, child)| (*position == index).then_some(*child));
        let Some(child) = child else {
            debug!(list = %variable.name, index, dropped = total - index, "truncating list");
            break;
        };
        retained.push(clean_segment(item, child)?);
    }
    Ok(retained)
}
