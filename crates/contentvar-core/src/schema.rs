use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::Service;

/// Emit the JSON Schema of a service document.
pub fn service_json_schema() -> RootSchema {
    schema_for!(Service)
}
