//! Builders for table API payloads.

use serde_json::{Value, json};

/// Instance URL used by every fixture link
pub const SITE: &str = "https://example.service-now.com";

/// `{"result": [..]}` body of a batch response
pub fn batch(records: &[Value]) -> String {
    json!({ "result": records }).to_string()
}

/// `{"result": {..}}` body of a single record response
pub fn single(record: Value) -> String {
    json!({ "result": record }).to_string()
}

/// `{"error": {"message": ..}}` body
pub fn error(message: &str) -> String {
    json!({ "error": { "message": message, "detail": null } }).to_string()
}

/// URL of a record of `table`
pub fn link_url(table: &str, sys_id: &str) -> String {
    format!("{SITE}/api/now/table/{table}/{sys_id}")
}

/// A reference field pointing at a record of `table`
pub fn reference(table: &str, sys_id: &str) -> Value {
    json!({ "link": link_url(table, sys_id), "value": sys_id })
}

/// A configuration item row
pub fn ci(sys_id: &str, name: &str, operational_status: &str) -> Value {
    json!({
        "sys_id": sys_id,
        "name": name,
        "short_description": format!("{name} description"),
        "operational_status": operational_status,
    })
}

/// A `cmdb_rel_ci` row linking `child` to `parent`
pub fn relation(sys_id: &str, type_id: &str, child: &str, parent: &str) -> Value {
    json!({
        "sys_id": sys_id,
        "type": reference("cmdb_rel_type", type_id),
        "child": reference("cmdb_ci", child),
        "parent": reference("cmdb_ci", parent),
    })
}
