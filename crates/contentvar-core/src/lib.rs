//! Schema-driven validation, defaulting and cleanup of device-service payloads.
//!
//! A [`Service`] describes each payload field as a [`ContentVariable`] tree.
//! The engine checks decoded messages against that tree, fills declared
//! defaults and strips undeclared fields. It performs no I/O and keeps no
//! state between calls.

pub mod clean;
pub mod cleanup;
pub mod defaults;
pub mod error;
pub mod message;
pub mod model;
pub mod schema;
pub mod validate;

pub use clean::{clean, clean_contents};
pub use cleanup::{remove_unknown_fields, remove_unknown_fields_contents};
pub use defaults::{apply_defaults, apply_defaults_contents, default_missing_fields};
pub use error::{Result, ValidationError, ValidationIssue, ValidationReport};
pub use message::{Message, MessageKind, MessageObject};
pub use model::{
    Children, Content, ContentVariable, Direction, Serialization, Service, VariableType, WILDCARD,
};
pub use schema::service_json_schema;
pub use validate::{
    ValidationOptions, validate, validate_contents, validate_report, validate_report_contents,
};
