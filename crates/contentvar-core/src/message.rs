use serde_json::{Map, Value};

use crate::model::VariableType;

/// Runtime payload tree as produced by the transport decoder.
pub type Message = Value;

/// Top-level payload object keyed by content variable name.
pub type MessageObject = Map<String, Value>;

/// Shape of a message segment, used when reporting type mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Null,
    Bool,
    Number,
    String,
    Object,
    Array,
}

impl MessageKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => MessageKind::Null,
            Value::Bool(_) => MessageKind::Bool,
            Value::Number(_) => MessageKind::Number,
            Value::String(_) => MessageKind::String,
            Value::Object(_) => MessageKind::Object,
            Value::Array(_) => MessageKind::Array,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageKind::Null => "null",
            MessageKind::Bool => "bool",
            MessageKind::Number => "number",
            MessageKind::String => "string",
            MessageKind::Object => "object",
            MessageKind::Array => "array",
        };
        f.write_str(name)
    }
}

/// Whether a scalar leaf satisfies the declared type.
///
/// Numbers satisfy both Integer and Float, whatever their literal form.
/// Containers and null never match here.
pub(crate) fn scalar_matches(variable_type: VariableType, value: &Value) -> bool {
    match value {
        Value::String(_) => variable_type == VariableType::String,
        Value::Number(_) => variable_type.is_numeric(),
        Value::Bool(_) => variable_type == VariableType::Boolean,
        Value::Null | Value::Object(_) | Value::Array(_) => false,
    }
}
