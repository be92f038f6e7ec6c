use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ValidationError};

/// Name used by a child variable that acts as a template for every entry of its parent.
pub const WILDCARD: &str = "*";

/// Declared type of a content variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum VariableType {
    #[serde(rename = "https://schema.org/Text")]
    String,
    #[serde(rename = "https://schema.org/Integer")]
    Integer,
    #[serde(rename = "https://schema.org/Float")]
    Float,
    #[serde(rename = "https://schema.org/Boolean")]
    Boolean,
    #[serde(rename = "https://schema.org/StructuredValue")]
    Structure,
    #[serde(rename = "https://schema.org/ItemList")]
    List,
}

impl VariableType {
    /// Integer and Float both accept any JSON number.
    pub fn is_numeric(self) -> bool {
        matches!(self, VariableType::Integer | VariableType::Float)
    }
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VariableType::String => "string",
            VariableType::Integer => "integer",
            VariableType::Float => "float",
            VariableType::Boolean => "boolean",
            VariableType::Structure => "structure",
            VariableType::List => "list",
        };
        f.write_str(name)
    }
}

/// Children of a content variable.
///
/// On the wire a wildcard is a single child named `*`; here it is a variant of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    /// One template applied to every key of an object or every element of a list.
    Wildcard(Box<ContentVariable>),
    /// Fixed children: field names for structures, decimal indices for lists.
    Named(Vec<ContentVariable>),
}

impl Children {
    /// Interpret a wire-level child list.
    pub fn from_variables(mut variables: Vec<ContentVariable>) -> Result<Self> {
        let is_wildcard = variables
            .first()
            .is_some_and(|first| first.name == WILDCARD);
        if !is_wildcard {
            return Ok(Children::Named(variables));
        }
        if variables.len() != 1 {
            return Err(ValidationError::InvalidSchema(format!(
                "wildcard child must be the only child, found {} children",
                variables.len()
            )));
        }
        match variables.pop() {
            Some(template) => Ok(Children::Wildcard(Box::new(template))),
            None => Ok(Children::Named(Vec::new())),
        }
    }

    /// Template of a wildcard, if any.
    pub fn template(&self) -> Option<&ContentVariable> {
        match self {
            Children::Wildcard(template) => Some(template),
            Children::Named(_) => None,
        }
    }
}

impl Default for Children {
    fn default() -> Self {
        Children::Named(Vec::new())
    }
}

/// Schema node describing one named, typed and possibly nested field of a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ContentVariableWire", into = "ContentVariableWire")]
pub struct ContentVariable {
    pub id: String,
    pub name: String,
    pub variable_type: VariableType,
    pub children: Children,
    /// Default inserted when the message omits this variable.
    pub value: Option<Value>,
    pub characteristic_id: Option<String>,
    pub unit_reference: Option<String>,
}

impl ContentVariable {
    pub fn new(name: impl Into<String>, variable_type: VariableType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            variable_type,
            children: Children::default(),
            value: None,
            characteristic_id: None,
            unit_reference: None,
        }
    }

    /// Children in wire form: a lone `*` child becomes a wildcard template,
    /// and `*` next to siblings is rejected as it is when deserializing.
    pub fn with_children(mut self, children: Vec<ContentVariable>) -> Result<Self> {
        self.children = Children::from_variables(children)?;
        Ok(self)
    }

    /// Template child applied to every entry; its name is forced to `*`.
    pub fn with_wildcard(mut self, mut template: ContentVariable) -> Self {
        template.name = WILDCARD.to_string();
        self.children = Children::Wildcard(Box::new(template));
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_characteristic(mut self, characteristic_id: impl Into<String>) -> Self {
        self.characteristic_id = Some(characteristic_id.into());
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }

    /// Owned copy of the declared default, `null` when none is declared.
    pub fn default_value(&self) -> Value {
        self.value.clone().unwrap_or(Value::Null)
    }

    /// Position addressed by a named child of a list variable.
    pub fn list_index(&self) -> Result<usize> {
        self.name.parse::<usize>().map_err(|_| {
            ValidationError::InvalidSchema(format!(
                "list variable name expected to be * or a number, got '{}'",
                self.name
            ))
        })
    }

    /// Named child with the given field name.
    pub fn child(&self, name: &str) -> Option<&ContentVariable> {
        match &self.children {
            Children::Named(children) => children.iter().find(|child| child.name == name),
            Children::Wildcard(_) => None,
        }
    }
}

impl JsonSchema for ContentVariable {
    fn schema_name() -> String {
        "ContentVariable".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        ContentVariableWire::json_schema(generator)
    }
}

/// Serialized form of a content variable as stored by the device repository.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct ContentVariableWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    name: String,
    #[serde(rename = "type")]
    variable_type: VariableType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_content_variables: Vec<ContentVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    characteristic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit_reference: Option<String>,
}

impl TryFrom<ContentVariableWire> for ContentVariable {
    type Error = ValidationError;

    fn try_from(wire: ContentVariableWire) -> Result<Self> {
        let children =
            Children::from_variables(wire.sub_content_variables).map_err(|err| match err {
                ValidationError::InvalidSchema(reason) => {
                    ValidationError::InvalidSchema(format!("variable '{}': {reason}", wire.name))
                }
                other => other,
            })?;
        Ok(Self {
            id: wire.id,
            name: wire.name,
            variable_type: wire.variable_type,
            children,
            value: wire.value,
            characteristic_id: wire.characteristic_id,
            unit_reference: wire.unit_reference,
        })
    }
}

impl From<ContentVariable> for ContentVariableWire {
    fn from(variable: ContentVariable) -> Self {
        let sub_content_variables = match variable.children {
            Children::Wildcard(template) => vec![*template],
            Children::Named(children) => children,
        };
        Self {
            id: variable.id,
            name: variable.name,
            variable_type: variable.variable_type,
            sub_content_variables,
            value: variable.value,
            characteristic_id: variable.characteristic_id,
            unit_reference: variable.unit_reference,
        }
    }
}

/// Serialization format of a content, consumed by marshallers only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Serialization {
    #[default]
    Json,
    Xml,
    PlainText,
}

/// One top-level content variable of a service payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Content {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub content_variable: ContentVariable,
    #[serde(default)]
    pub serialization: Serialization,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol_segment_id: String,
}

impl Content {
    pub fn new(content_variable: ContentVariable) -> Self {
        Self {
            id: String::new(),
            content_variable,
            serialization: Serialization::Json,
            protocol_segment_id: String::new(),
        }
    }
}

/// Payload direction of a service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inputs,
    #[default]
    Outputs,
}

/// Payload schema of one device service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Service {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub local_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Content>,
    #[serde(default)]
    pub outputs: Vec<Content>,
}

impl Service {
    /// Service whose outputs are the given top-level variables.
    pub fn with_outputs(outputs: Vec<ContentVariable>) -> Self {
        Self {
            outputs: outputs.into_iter().map(Content::new).collect(),
            ..Self::default()
        }
    }

    pub fn contents(&self, direction: Direction) -> &[Content] {
        match direction {
            Direction::Inputs => &self.inputs,
            Direction::Outputs => &self.outputs,
        }
    }
}
