//! Variable resolution over views and diagram containers

use cmdb_expr::{Evaluator, expand, get_variable};
use cmdb_model::{Model, Subject};
use cmdb_test_utils::MockFetcher;
use pretty_assertions::assert_eq;

fn add_element(model: &mut Model, type_name: &str, id: &str, cost: &str) {
    let concept = model.create_typed(type_name, id).unwrap();
    let folder = model.default_folder_for(&concept).unwrap().id.clone();
    model.attach(&folder, concept).unwrap();
    model.set_name(id, id).unwrap();
    model.set_property(id, "cost", cost).unwrap();
}

/// A rack node (cost 5) holding two servers (cost 10 and 20)
fn rack_model() -> (Model, String, String) {
    let mut model = Model::new("Datacenter");
    add_element(&mut model, "Equipment", "rack", "5");
    add_element(&mut model, "Node", "srv-a", "10");
    add_element(&mut model, "Node", "srv-b", "20");

    let view = model.add_view("Room 1").unwrap();
    let rack = model.add_node(&view, None, Some("rack"), "").unwrap();
    model.add_node(&view, Some(&rack), Some("srv-a"), "").unwrap();
    model.add_node(&view, Some(&rack), Some("srv-b"), "").unwrap();
    (model, view, rack)
}

fn rack_subject<'a>(model: &'a Model, view: &str, rack: &str) -> Subject<'a> {
    let view = model.view(view).unwrap();
    Subject::node(model, view, view.node(rack).unwrap())
}

#[test]
fn test_sum_includes_container_and_children() {
    let (model, view, rack) = rack_model();
    let subject = Some(rack_subject(&model, &view, &rack));

    assert_eq!(
        get_variable("${sum:${property:cost}}", subject).unwrap().as_deref(),
        Some("35")
    );
    assert_eq!(
        get_variable("${sumx:${property:cost}}", subject).unwrap().as_deref(),
        Some("30")
    );
    assert_eq!(
        get_variable("${sum:property:cost}", subject).unwrap().as_deref(),
        Some("35")
    );
}

#[test]
fn test_sum_over_view_recurses_into_nested_nodes() {
    let (model, view, _) = rack_model();
    let subject = Some(Subject::view(&model, model.view(&view).unwrap()));
    assert_eq!(
        get_variable("${sum:${property:cost}}", subject).unwrap().as_deref(),
        Some("35")
    );
}

#[test]
fn test_sum_ignores_non_numeric_values() {
    let (mut model, view, rack) = rack_model();
    model.set_property("srv-b", "cost", "n/a").unwrap();
    let subject = Some(rack_subject(&model, &view, &rack));
    assert_eq!(
        get_variable("${sum:${property:cost}}", subject).unwrap().as_deref(),
        Some("15")
    );
}

#[test]
fn test_sum_overflow_is_null() {
    let (mut model, view, rack) = rack_model();
    model.set_property("rack", "cost", &i64::MAX.to_string()).unwrap();
    model.set_property("srv-a", "cost", "1").unwrap();
    model.set_property("srv-b", "cost", "0").unwrap();
    let subject = Some(rack_subject(&model, &view, &rack));

    assert_eq!(get_variable("${sum:${property:cost}}", subject).unwrap(), None);
    assert_eq!(
        expand("total=${sum:${property:cost}}", subject).unwrap(),
        "total="
    );
    // the children alone still fit
    assert_eq!(
        get_variable("${sumx:${property:cost}}", subject).unwrap().as_deref(),
        Some("1")
    );
}

#[test]
fn test_sumx_on_plain_element_is_zero() {
    let (model, _, _) = rack_model();
    let subject = Subject::by_id(&model, "srv-a");
    assert_eq!(
        get_variable("${sumx:${property:cost}}", subject).unwrap().as_deref(),
        Some("0")
    );
}

#[test]
fn test_view_family_from_a_node() {
    let (model, view, rack) = rack_model();
    let subject = Some(rack_subject(&model, &view, &rack));
    assert_eq!(
        expand("${view:name} / ${name} / ${class}", subject).unwrap(),
        "Room 1 / rack / Equipment"
    );
}

#[test]
fn test_evaluator_delegates_whole_variables() {
    let (model, view, rack) = rack_model();
    let subject = Some(rack_subject(&model, &view, &rack));
    let fetcher = MockFetcher::new();
    let mut evaluator = Evaluator::new(&fetcher);
    assert_eq!(
        evaluator
            .evaluate("${sumx:${property:cost}}", None, subject)
            .unwrap()
            .as_deref(),
        Some("30")
    );
    assert_eq!(fetcher.total_calls(), 0);
}
