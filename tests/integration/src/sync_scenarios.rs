//! End-to-end synchronization scenarios
//!
//! These tests exercise the complete flow: configuration file -> importer
//! with canned table payloads -> model file saved and reloaded.

use cmdb_core::{ImportMode, Importer, Settings, SyncConfig};
use cmdb_model::{FolderType, Model};
use cmdb_test_utils::records::{SITE, link_url};
use cmdb_test_utils::{MockFetcher, TestWorkspace};
use pretty_assertions::assert_eq;
use serde_json::Value;

/// Load the sample configuration, pointed at the mocked instance
fn sample_config() -> SyncConfig {
    let text = TestWorkspace::fixture("config/cmdb-sync.toml").replace("http://127.0.0.1:1", SITE);
    SyncConfig::from_settings(&Settings::parse(&text).unwrap()).unwrap()
}

fn table_prefix(table: &str) -> String {
    format!("{SITE}/api/now/table/{table}?")
}

fn payload(name: &str) -> String {
    TestWorkspace::fixture(&format!("payloads/{name}.json"))
}

/// Servers payload with the operational status of one record replaced
fn servers_with_status(sys_id: &str, status: &str) -> String {
    let mut body: Value = serde_json::from_str(&payload("servers")).unwrap();
    for record in body["result"].as_array_mut().unwrap() {
        if record["sys_id"] == sys_id {
            record["operational_status"] = Value::from(status);
        }
    }
    body.to_string()
}

fn inventory_fetcher() -> MockFetcher {
    MockFetcher::new()
        .with_prefix_route(&table_prefix("cmdb_ci_server"), &payload("servers"))
        .with_prefix_route(&table_prefix("cmdb_ci_appl"), &payload("applications"))
        .with_prefix_route(&table_prefix("cmdb_rel_ci"), &payload("relations"))
        .with_route(&link_url("cmn_location", "loc-par"), &payload("location_paris"))
        .with_route(&link_url("cmdb_rel_type", "t-runs"), &payload("type_runs"))
        .with_route(&link_url("cmdb_rel_type", "t-depends"), &payload("type_depends"))
        .with_route(&link_url("cmdb_rel_type", "t-other"), &payload("type_other"))
}

#[test]
fn test_sample_configuration_mapping() {
    let config = sample_config();

    let tables: Vec<_> = config.elements.iter().map(|m| m.table.as_str()).collect();
    assert_eq!(tables, vec!["cmdb_ci_appl", "cmdb_ci_server"]);
    assert_eq!(config.elements[0].import_mode, ImportMode::CreateOrUpdateOnly);
    assert_eq!(config.elements[1].import_mode, ImportMode::Full);
    assert_eq!(config.service.timeout.as_secs(), 2);

    let urls = config.fetch_urls().unwrap();
    assert_eq!(urls.len(), 3);
    assert_eq!(urls[2].0, "cmdb_rel_ci");
    assert!(urls.iter().all(|(_, url)| !url.contains("s3cret")));
}

#[test]
fn test_first_sync_builds_the_model() {
    let ws = TestWorkspace::new();
    ws.init_model("Inventory");
    let config = sample_config();
    let fetcher = inventory_fetcher();

    let mut model = ws.load_model();
    let report = Importer::new(&config, &fetcher).run(&mut model);
    model.save(&ws.model_path()).unwrap();

    let servers = report.batch("cmdb_ci_server").unwrap();
    assert_eq!(
        (servers.received, servers.created, servers.skipped),
        (3, 2, 1)
    );
    let apps = report.batch("cmdb_ci_appl").unwrap();
    assert_eq!((apps.received, apps.created), (2, 2));
    let relations = report.batch("cmdb_rel_ci").unwrap();
    assert_eq!(
        (relations.received, relations.created, relations.skipped),
        (4, 2, 1)
    );
    assert_eq!(relations.errors.len(), 1);
    assert_eq!(relations.errors[0].id, "rel-003");
    assert!(report.batches.iter().all(|b| !b.is_aborted()));

    // one fetch per distinct link within a pass
    assert_eq!(fetcher.calls(&link_url("cmn_location", "loc-par")), 1);
    assert_eq!(fetcher.calls(&link_url("cmdb_rel_type", "t-runs")), 1);

    let model = ws.load_model();
    let web = model.concept("srv-001").unwrap();
    assert_eq!(web.class, "Node");
    assert_eq!(web.name, "lnx-web-01");
    assert_eq!(web.documentation, "Frontend web server");
    assert_eq!(web.property("IP"), Some("10.0.0.11"));
    assert_eq!(web.property("ServiceNow class"), Some("cmdb_ci_linux_server"));
    assert_eq!(
        model.folder_path("srv-001"),
        Some(vec!["Servers".to_string(), "Paris".to_string()])
    );
    assert!(model.concept("srv-003").is_none());

    let shop = model.concept("app-001").unwrap();
    assert_eq!(shop.class, "ApplicationComponent");
    assert_eq!(shop.property("IP"), None);
    assert_eq!(
        model.folder_of("app-001").map(|f| f.folder_type),
        Some(FolderType::Application)
    );

    let runs_on = model.concept("rel-001").unwrap();
    assert_eq!(runs_on.class, "ServingRelationship");
    assert_eq!(runs_on.endpoints(), Some(("srv-001", "app-001")));
    let depends = model.concept("rel-002").unwrap();
    assert_eq!(depends.class, "FlowRelationship");
    assert_eq!(depends.name, "depends on");
    assert_eq!(depends.endpoints(), Some(("app-001", "app-002")));
    assert_eq!(
        model.folder_of("rel-002").map(|f| f.folder_type),
        Some(FolderType::Relations)
    );
    assert!(model.concept("rel-003").is_none());
    assert!(model.concept("rel-004").is_none());
}

#[test]
fn test_second_sync_is_a_no_op() {
    let ws = TestWorkspace::new();
    ws.init_model("Inventory");
    let config = sample_config();

    let mut model = ws.load_model();
    Importer::new(&config, &inventory_fetcher()).run(&mut model);
    model.save(&ws.model_path()).unwrap();

    let mut model = ws.load_model();
    let revision = model.revision();
    let report = Importer::new(&config, &inventory_fetcher()).run(&mut model);

    assert_eq!(report.changes(), 0);
    assert_eq!(model.revision(), revision);
    assert_eq!(report.batch("cmdb_ci_server").unwrap().unchanged, 2);
    assert_eq!(report.batch("cmdb_ci_appl").unwrap().unchanged, 2);
    assert_eq!(report.batch("cmdb_rel_ci").unwrap().unchanged, 2);
}

#[test]
fn test_retired_server_is_removed_but_mode_protects_applications() {
    let config = sample_config();
    let mut model = Model::new("Inventory");
    Importer::new(&config, &inventory_fetcher()).run(&mut model);
    let view = model.add_view("Datacenter").unwrap();
    model.add_node(&view, None, Some("srv-002"), "").unwrap();

    let mut apps: Value = serde_json::from_str(&payload("applications")).unwrap();
    apps["result"][1]["operational_status"] = Value::from("6");
    let fetcher = inventory_fetcher();
    fetcher.set_prefix_route(
        &table_prefix("cmdb_ci_server"),
        &servers_with_status("srv-002", "7"),
    );
    fetcher.set_prefix_route(&table_prefix("cmdb_ci_appl"), &apps.to_string());

    let report = Importer::new(&config, &fetcher).run(&mut model);

    assert_eq!(report.batch("cmdb_ci_server").unwrap().removed, 1);
    assert!(model.concept("srv-002").is_none());
    assert!(model.views_referencing("srv-002").is_empty());

    // create_or_update_only never removes
    let apps = report.batch("cmdb_ci_appl").unwrap();
    assert_eq!((apps.removed, apps.skipped), (0, 1));
    assert!(model.concept("app-002").is_some());
}

#[test]
fn test_unreachable_relations_table_keeps_element_changes() {
    let config = sample_config();
    let fetcher = inventory_fetcher().with_status(&table_prefix("cmdb_rel_ci"), 503);
    let mut model = Model::new("Inventory");

    let report = Importer::new(&config, &fetcher).run(&mut model);

    assert!(report.has_failures());
    let relations = report.batch("cmdb_rel_ci").unwrap();
    assert!(relations.is_aborted());
    assert_eq!(relations.received, 0);
    assert_eq!(report.created(), 4);
    assert!(model.concept("srv-001").is_some());
}
