//! Expressions evaluated against an imported model
//!
//! The model is built by a synchronization run over the sample payloads,
//! then templates are expanded against the resulting objects.

use cmdb_core::{Importer, Settings, SyncConfig};
use cmdb_expr::{Evaluator, expand, get_variable};
use cmdb_model::{Model, Subject};
use cmdb_test_utils::records::{SITE, link_url};
use cmdb_test_utils::{MockFetcher, TestWorkspace};
use pretty_assertions::assert_eq;
use serde_json::json;

fn imported_model() -> Model {
    let text = TestWorkspace::fixture("config/cmdb-sync.toml").replace("http://127.0.0.1:1", SITE);
    let config = SyncConfig::from_settings(&Settings::parse(&text).unwrap()).unwrap();
    let payload = |name: &str| TestWorkspace::fixture(&format!("payloads/{name}.json"));
    let table = |name: &str| format!("{SITE}/api/now/table/{name}?");
    let fetcher = MockFetcher::new()
        .with_prefix_route(&table("cmdb_ci_server"), &payload("servers"))
        .with_prefix_route(&table("cmdb_ci_appl"), &payload("applications"))
        .with_prefix_route(&table("cmdb_rel_ci"), &payload("relations"))
        .with_route(&link_url("cmn_location", "loc-par"), &payload("location_paris"))
        .with_route(&link_url("cmdb_rel_type", "t-runs"), &payload("type_runs"))
        .with_route(&link_url("cmdb_rel_type", "t-depends"), &payload("type_depends"))
        .with_route(&link_url("cmdb_rel_type", "t-other"), &payload("type_other"));

    let mut model = Model::new("Inventory");
    Importer::new(&config, &fetcher).run(&mut model);
    model
}

#[test]
fn test_template_over_imported_element() {
    let model = imported_model();
    let subject = Subject::by_id(&model, "srv-001");

    assert_eq!(
        expand("${name} [${property:IP}] in ${model:${name}}", subject).unwrap(),
        "lnx-web-01 [10.0.0.11] in Inventory"
    );
    assert_eq!(
        expand("${class}: ${property:missing}.", subject).unwrap(),
        "Node: ."
    );
}

#[test]
fn test_relationship_ends() {
    let model = imported_model();
    let subject = Subject::by_id(&model, "rel-001");

    assert_eq!(
        expand("${source:${name}} serves ${target:${name}}", subject).unwrap(),
        "lnx-web-01 serves Webshop"
    );
    assert_eq!(
        get_variable("${source:${property:IP}}", subject).unwrap().as_deref(),
        Some("10.0.0.11")
    );
}

#[test]
fn test_property_present_and_absent() {
    let mut model = imported_model();
    model.set_property("app-001", "owner", "Alice").unwrap();

    assert_eq!(
        get_variable("${property:owner}", Subject::by_id(&model, "app-001"))
            .unwrap()
            .as_deref(),
        Some("Alice")
    );
    assert_eq!(
        get_variable("${property:owner}", Subject::by_id(&model, "app-002")).unwrap(),
        None
    );
}

#[test]
fn test_costs_summed_over_a_diagram() {
    let mut model = imported_model();
    for (id, cost) in [("app-001", "5"), ("srv-001", "10"), ("srv-002", "20")] {
        model.set_property(id, "cost", cost).unwrap();
    }
    let view_id = model.add_view("Webshop hosting").unwrap();
    let shop = model.add_node(&view_id, None, Some("app-001"), "").unwrap();
    model.add_node(&view_id, Some(&shop), Some("srv-001"), "").unwrap();
    model.add_node(&view_id, Some(&shop), Some("srv-002"), "").unwrap();

    let view = model.view(&view_id).unwrap();
    let subject = Some(Subject::node(&model, view, view.node(&shop).unwrap()));
    assert_eq!(
        get_variable("${sum:${property:cost}}", subject).unwrap().as_deref(),
        Some("35")
    );
    assert_eq!(
        get_variable("${sumx:${property:cost}}", subject).unwrap().as_deref(),
        Some("30")
    );
}

#[test]
fn test_record_fields_and_subject_variables_side_by_side() {
    let model = imported_model();
    let fetcher = MockFetcher::new();
    let mut evaluator = Evaluator::new(&fetcher);
    let record = json!({"sys_id": "srv-001", "name": "renamed-host"});
    let subject = Subject::by_id(&model, "srv-001");

    assert_eq!(
        evaluator.evaluate("name", Some(&record), subject).unwrap().as_deref(),
        Some("renamed-host")
    );
    assert_eq!(
        evaluator.evaluate("${name}", Some(&record), subject).unwrap().as_deref(),
        Some("lnx-web-01")
    );
    assert_eq!(
        evaluator.evaluate("\"Servers\"", Some(&record), subject).unwrap().as_deref(),
        Some("Servers")
    );
    assert_eq!(fetcher.total_calls(), 0);
}
