mod common;

use common::{shop_graph_path, shop_input, SHOP_CLASSES};
use indoc::indoc;
use servicemap::graph::{ClassKind, GraphDocument, PRIMITIVE_TYPE_SIZE};
use servicemap::Error;

#[test]
fn test_shop_fixture_loads() {
    let input = shop_input();
    assert_eq!(input.len(), 9);
    assert_eq!(input.other_classes().len(), 6);
    assert_eq!(input.data_classes().count(), 3);

    let behavioral: Vec<&str> = input
        .other_classes()
        .iter()
        .map(|id| input.class(*id).identifier.as_str())
        .collect();
    assert_eq!(behavioral, SHOP_CLASSES.to_vec());
}

#[test]
fn test_class_attributes_survive_loading() {
    let input = shop_input();
    let view = input.class(input.lookup("shop.CartView").unwrap());

    assert_eq!(view.name, "CartView");
    assert_eq!(view.size, 250);
    assert_eq!(view.location, "src/shop/CartView.java");
    assert!(view.features.contains("cart"));
    assert!(matches!(
        view.kind,
        ClassKind::Other {
            method_count: 2,
            api_entry_point: true
        }
    ));
}

#[test]
fn test_dynamic_frequency_counts_as_calls() {
    let input = shop_input();
    let cart = input.lookup("shop.Cart").unwrap();
    let view = input.lookup("shop.CartView").unwrap();
    let order = input.lookup("shop.Order").unwrap();

    assert!(input.calls_between(view, cart) > input.calls_between(order, cart));
    assert!(input.neighbors(cart).contains(&view));
    assert!(input.neighbors(cart).contains(&order));
}

#[test]
fn test_data_access_is_indexed_per_caller() {
    let input = shop_input();
    let invoice = input.lookup("shop.Invoice").unwrap();
    let invoice_row = input.lookup("shop.InvoiceRow").unwrap();
    let order_row = input.lookup("shop.OrderRow").unwrap();

    let access = input.data_access(invoice);
    assert!(access[&invoice_row].writes);
    assert!(!access[&order_row].writes);
    assert!(input.dependences(invoice).iter().all(|pair| pair.target != invoice_row));
}

#[test]
fn test_shared_class_overhead_uses_type_sizes() {
    let input = shop_input();
    let order = input.lookup("shop.Order").unwrap();
    let mailer = input.lookup("shop.OrderMailer").unwrap();

    let pair = input
        .dependences(order)
        .iter()
        .find(|pair| pair.target == mailer)
        .unwrap();
    // one OrderRow (120) and two primitives
    assert_eq!(pair.overhead, 120.0 + 2.0 * PRIMITIVE_TYPE_SIZE);
}

#[test]
fn test_unknown_endpoint_is_graph_error() {
    let json = indoc! {r#"
        {
          "classes": [{"identifier": "a.A", "kind": "other"}],
          "relationships": [{"caller": "a.A", "callee": "a.Missing", "static_frequency": 1}]
        }
    "#};
    let result = GraphDocument::from_json(json).unwrap().into_input();
    assert!(matches!(result, Err(Error::Graph(_))));
}

#[test]
fn test_duplicate_identifier_is_graph_error() {
    let json = indoc! {r#"
        {
          "classes": [
            {"identifier": "a.A", "kind": "other"},
            {"identifier": "a.A", "kind": "data"}
          ]
        }
    "#};
    let result = GraphDocument::from_json(json).unwrap().into_input();
    assert!(matches!(result, Err(Error::Graph(_))));
}

#[test]
fn test_data_relationship_to_behavioral_class_is_graph_error() {
    let json = indoc! {r#"
        {
          "classes": [
            {"identifier": "a.A", "kind": "other"},
            {"identifier": "a.B", "kind": "other"}
          ],
          "relationships": [
            {"caller": "a.A", "callee": "a.B", "static_frequency": 1, "access": "read"}
          ]
        }
    "#};
    let result = GraphDocument::from_json(json).unwrap().into_input();
    assert!(matches!(result, Err(Error::Graph(_))));
}

#[test]
fn test_malformed_file_reports_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"classes\": [").unwrap();

    let err = GraphDocument::load(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
    assert!(shop_graph_path().is_file());
}
