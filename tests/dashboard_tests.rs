//! End-to-end tests over the seeded dashboard collections

use serde_json::json;
use tabula::prelude::*;

fn config() -> EngineConfig {
    EngineConfig {
        gateway: GatewayConfig::instant(),
        ..EngineConfig::default_config()
    }
}

#[tokio::test]
async fn test_products_default_sort_by_sales() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let view = dashboard
        .products
        .query(QuerySpec::new().sort(SortSpec::desc("sales")))
        .unwrap();

    let names: Vec<_> = view.iter().map(|p| p.name.as_str()).collect();
    // Equal sales keep catalog order
    assert_eq!(names, vec!["Nike Air Max 97", "Denim Jacket", "Jordan Air"]);
    assert_eq!(view.pagination().unwrap().total_pages, 1);
}

#[tokio::test]
async fn test_sort_header_toggle() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let first = SortSpec::toggle(None, "price");
    let second = SortSpec::toggle(Some(&first), "price");

    let asc = dashboard.products.query(QuerySpec::new().sort(first)).unwrap();
    let desc = dashboard.products.query(QuerySpec::new().sort(second)).unwrap();
    assert_eq!(asc.records[0].name, "Jordan Air");
    assert_eq!(desc.records[0].name, "Nike Air Max 97");
}

#[tokio::test]
async fn test_category_filter_and_search() {
    let dashboard = Dashboard::seeded(&config()).unwrap();

    let shoes = dashboard
        .products
        .query(QuerySpec::new().filter("category", FieldFilter::Equals("Men's Shoes".into())))
        .unwrap();
    assert_eq!(shoes.len(), 1);

    let by_category_text = dashboard.products.query(QuerySpec::new().search("t-shirt")).unwrap();
    assert_eq!(by_category_text.records[0].name, "Jordan Air");
}

#[tokio::test]
async fn test_customer_search_covers_email() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let view = dashboard.customers.query(QuerySpec::new().search("BARNETT@")).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.records[0].name, "Tom Barnett");
}

#[tokio::test]
async fn test_join_date_range_filter() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let params = QueryParams {
        page: 1,
        limit: 10,
        search: None,
        filter: Some(r#"{"joinDate>=": "2023-03-01"}"#.to_string()),
        sort: Some("joinDate:desc".to_string()),
    };

    let view = dashboard.customers.query_params(&params).unwrap();
    let names: Vec<_> = view.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Donald Cortez", "Jenson Doyle"]);
}

#[tokio::test]
async fn test_team_members_without_history_sort_last() {
    let dashboard = Dashboard::seeded(&config()).unwrap();

    for direction in [SortDirection::Asc, SortDirection::Desc] {
        let view = dashboard
            .team_members
            .query(QuerySpec::new().sort(SortSpec {
                key: "totalOrders".to_string(),
                direction,
            }))
            .unwrap();
        let tail: Vec<_> = view.records[3..].iter().map(|m| m.first_name.as_str()).collect();
        assert_eq!(tail, vec!["Lisa", "David"]);
    }
}

#[tokio::test]
async fn test_team_members_sort_by_full_name() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let view = dashboard
        .team_members
        .query(QuerySpec::new().sort(SortSpec::asc("name")))
        .unwrap();
    let first: Vec<_> = view.iter().map(|m| m.first_name.as_str()).collect();
    assert_eq!(first, vec!["David", "Lisa", "Mike", "Sarah", "Zac"]);
}

#[tokio::test]
async fn test_order_status_update_publishes_event() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let mut events = dashboard.events.subscribe();

    let order = dashboard
        .orders
        .gateway()
        .update("2", json!({"status": "completed"}))
        .await
        .unwrap();
    assert_eq!(order.status, tabula::catalog::OrderStatus::Completed);

    let envelope = events.recv().await.unwrap();
    assert_eq!(envelope.event.collection(), "orders");
    assert_eq!(envelope.event.action(), "updated");
    assert!(!dashboard.is_busy());
}

#[tokio::test]
async fn test_unknown_status_is_a_field_error() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let err = dashboard
        .orders
        .gateway()
        .update("2", json!({"status": "shipped"}))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_add_product_then_page() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let gateway = dashboard.products.gateway();

    for n in 0..10 {
        gateway
            .create(json!({
                "name": format!("Tee {}", n),
                "category": "Men's T-Shirt",
                "stockCount": 10,
                "stockStatus": "in-stock",
                "price": 19.99,
                "tags": ["new"]
            }))
            .await
            .unwrap();
    }

    // Default page size for products is 10
    let first = dashboard.products.query(QuerySpec::new()).unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(first.total, 13);
    assert!(first.pagination().unwrap().has_next);

    let tagged = dashboard
        .products
        .query(QuerySpec::new().filter("tags", FieldFilter::Equals("new".into())))
        .unwrap();
    assert_eq!(tagged.total, 10);
}

#[tokio::test]
async fn test_seeded_notifications() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    assert_eq!(dashboard.notifications.len(), 3);
    assert_eq!(dashboard.notifications.unread_count(), 2);
    assert_eq!(dashboard.notifications.list()[0].title, "New Order");
}

#[tokio::test]
async fn test_export_filtered_team_view() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let view = dashboard
        .team_members
        .query(QuerySpec::new().filter("department", FieldFilter::Equals("Sales".into())))
        .unwrap();

    let exported = view.to_csv(&TeamMember::export_columns()).unwrap();
    assert_eq!(exported.rows, 2);
    assert_eq!(
        exported.content,
        "Name,Email,Role,Department,Status,Join Date\n\
         Sarah Wilson,sarah.wilson@xenith.com,Manager,Sales,active,2023-02-20\n\
         Mike Johnson,mike.johnson@xenith.com,Sales Rep,Sales,active,2023-03-10\n"
    );
}

#[tokio::test]
async fn test_export_selected_members_through_gateway() {
    let dashboard = Dashboard::seeded(&config()).unwrap();
    let exported = dashboard
        .team_members
        .gateway()
        .export(
            Some(vec!["user-5".to_string(), "user-1".to_string()]),
            TeamMember::export_columns(),
        )
        .await
        .unwrap();

    let lines: Vec<_> = exported.content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("Zac Hudson,"));
    assert!(lines[2].starts_with("David Brown,"));
    assert!(exported.filename.ends_with(".csv"));
}
