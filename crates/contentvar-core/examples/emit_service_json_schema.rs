use contentvar_core::service_json_schema;

fn main() {
    let schema = service_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
