//! Shared test harness for store, pipeline and gateway testing
//!
//! Provides `SalesRecord`, a small record whose `sales` field may be absent,
//! plus helpers for building stores and gateways over it.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tabula::config::GatewayConfig;
use tabula::core::validation::{self, FieldRules};
use tabula::core::{EventBus, RecordStore};
use tabula::impl_record;
use tabula::storage::MutationGateway;

// ---------------------------------------------------------------------------
// SalesRecord
// ---------------------------------------------------------------------------

/// A record with a text field, an optional number and a region tag.
///
/// - `name`: searchable, required
/// - `sales`: Integer, `None` sorts last
/// - `region`: plain string for filter testing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sales: Option<i64>,
    #[serde(default)]
    pub region: String,
}

impl_record!(SalesRecord, "sales_records",
    search: ["name"],
    required: ["name"],
    fields: {
        "id" => |r| r.id.as_str(),
        "name" => |r| r.name.as_str(),
        "sales" => |r| r.sales,
        "region" => |r| r.region.as_str(),
    },
    rules: FieldRules::new()
        .rule("name", validation::not_blank())
        .rule("sales", validation::non_negative())
);

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn record(id: &str, name: &str, sales: Option<i64>) -> SalesRecord {
    SalesRecord {
        id: id.to_string(),
        name: name.to_string(),
        sales,
        region: "emea".to_string(),
    }
}

pub fn record_in(id: &str, name: &str, sales: Option<i64>, region: &str) -> SalesRecord {
    SalesRecord {
        region: region.to_string(),
        ..record(id, name, sales)
    }
}

/// Alice(10), Bob(30), Carl(20)
pub fn abc_records() -> Vec<SalesRecord> {
    vec![
        record("1", "Alice", Some(10)),
        record("2", "Bob", Some(30)),
        record("3", "Carl", Some(20)),
    ]
}

pub fn abc_store() -> RecordStore<SalesRecord> {
    RecordStore::with_records(abc_records()).expect("seed ids are unique")
}

/// A larger store with ties, gaps and several regions
pub fn mixed_store() -> RecordStore<SalesRecord> {
    let regions = ["emea", "apac", "amer"];
    let records = (1..=23)
        .map(|n| {
            let sales = if n % 5 == 0 { None } else { Some((n * 7 % 4) as i64) };
            record_in(&n.to_string(), &format!("Rep {:02}", n), sales, regions[n % 3])
        })
        .collect();
    RecordStore::with_records(records).expect("seed ids are unique")
}

pub fn names(records: &[SalesRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

pub fn ids(records: &[SalesRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

/// Gateway with the given latency for every operation
pub fn gateway(store: &RecordStore<SalesRecord>, latency_ms: u64) -> MutationGateway<SalesRecord> {
    MutationGateway::spawn(store.clone(), GatewayConfig::uniform(latency_ms))
}

pub fn gateway_with_events(
    store: &RecordStore<SalesRecord>,
    latency_ms: u64,
) -> (MutationGateway<SalesRecord>, EventBus) {
    let events = EventBus::new(64);
    let gateway =
        MutationGateway::spawn_with_events(store.clone(), GatewayConfig::uniform(latency_ms), events.clone());
    (gateway, events)
}
