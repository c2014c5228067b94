//! Walk through the seeded dashboard: queries, mutations and notifications
//!
//! ```sh
//! RUST_LOG=debug cargo run --example dashboard
//! ```

use anyhow::Result;
use serde_json::json;
use tabula::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tabula::telemetry::init_tracing("info");

    let config = EngineConfig {
        gateway: GatewayConfig::uniform(150),
        ..EngineConfig::default_config()
    };
    let dashboard = Dashboard::seeded(&config)?;

    // Print change events as they are applied
    let mut events = dashboard.events.subscribe();
    tokio::spawn(async move {
        while let Ok(envelope) = events.recv().await {
            println!(
                "  [event v{}] {} {} {}",
                envelope.version,
                envelope.event.collection(),
                envelope.event.action(),
                envelope.event.record_id()
            );
        }
    });

    println!("Top products by sales:");
    let top = dashboard
        .products
        .query(QuerySpec::new().sort(SortSpec::desc("sales")))?;
    for product in top.iter() {
        println!("  {:<20} {:>6} sold  ${:.2}", product.name, product.raw_sales, product.price);
    }

    println!("\nCustomers who joined from March 2023:");
    let params = QueryParams {
        page: 1,
        limit: 10,
        search: None,
        filter: Some(r#"{"joinDate>=": "2023-03-01"}"#.to_string()),
        sort: Some("joinDate:asc".to_string()),
    };
    let recent = dashboard.customers.query_params(&params)?;
    for customer in recent.iter() {
        println!("  {} ({})", customer.name, customer.join_date);
    }
    if let Some(meta) = recent.pagination() {
        println!("  page {} of {}, {} total", meta.page, meta.total_pages, meta.total);
    }

    println!("\nMarking order 2 completed...");
    let order = dashboard
        .orders
        .gateway()
        .update("2", json!({"status": "completed"}))
        .await?;
    println!("  order {} is now {}", order.id, order.status.as_str());

    println!("\nAdding a team member...");
    let member = dashboard
        .team_members
        .gateway()
        .create(json!({
            "firstName": "Nora",
            "lastName": "Quinn",
            "email": "nora.quinn@xenith.com",
            "role": "Sales Rep",
            "department": "Sales",
            "status": "pending",
            "joinDate": "2024-07-01",
            "lastLogin": Utc::now()
        }))
        .await?;
    println!("  created {} as {}", member.full_name(), member.id);

    println!("\nTrying an invalid email...");
    if let Err(err) = dashboard
        .customers
        .gateway()
        .update("1", json!({"email": "robert"}))
        .await
    {
        dashboard.report(err);
    }

    dashboard.products.gateway().inject_faults(1);
    if let Err(err) = dashboard.products.gateway().delete("3").await {
        dashboard.report(err);
    }

    println!("\nNotifications ({} unread):", dashboard.notifications.unread_count());
    for notification in dashboard.notifications.list() {
        let marker = if notification.read { " " } else { "*" };
        println!("  {} {}: {}", marker, notification.title, notification.message);
    }

    let exported = dashboard
        .team_members
        .gateway()
        .export(None, TeamMember::export_columns())
        .await?;
    println!("\nExported {} team members to {}:", exported.rows, exported.filename);
    print!("{}", exported.content);

    let mut preferences = PreferenceStore::load(MemoryKeyValueStore::new());
    if let Some(product) = dashboard.products.store().get("1") {
        preferences.add_to_cart(&product)?;
        preferences.update_quantity(&product.id, 2)?;
    }
    let summary = preferences.cart_summary();
    println!(
        "\nCart: {} items, subtotal ${:.2}, shipping ${:.2}, total ${:.2}",
        summary.item_count, summary.subtotal, summary.shipping, summary.total
    );

    Ok(())
}
