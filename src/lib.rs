//! # Tabula
//!
//! A client-side tabular data engine for admin dashboards.
//!
//! ## Features
//!
//! - **Copy-on-write stores**: queries always see a whole snapshot, never a partial write
//! - **Query pipeline**: search, filter, stable sort and paginate any record shape
//! - **Mutation gateway**: latency-simulating create/update/delete applied in issue order
//! - **Typed errors**: every failure is recoverable and maps to a notification
//! - **Change events**: broadcast after each applied mutation
//! - **CSV export**: any view or id selection, with configurable columns
//! - **Preferences**: theme, cart and wishlist behind a key-value store
//! - **Configuration-Based**: latencies and per-collection settings via YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabula::prelude::*;
//! use serde_json::json;
//!
//! let dashboard = Dashboard::seeded(&EngineConfig::default_config())?;
//!
//! // Top sellers first
//! let view = dashboard
//!     .products
//!     .query(QuerySpec::new().sort(SortSpec::desc("sales")))?;
//!
//! // Writes resolve after the simulated round trip
//! let updated = dashboard
//!     .customers
//!     .gateway()
//!     .update("4", json!({ "status": "active" }))
//!     .await?;
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod storage;
pub mod telemetry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{EngineError, ExportError, MutationError, QueryError, ValidationError},
        events::{EventBus, EventEnvelope, RecordEvent},
        export::{CsvExport, ExportColumn},
        field::{FieldFormat, FieldValue},
        notification::{Notification, NotificationCenter, NotificationKind},
        pipeline::QueryPipeline,
        query::{
            DerivedView, FieldFilter, PageWindow, PaginationMeta, QueryParams, QuerySpec,
            SortDirection, SortSpec,
        },
        record::Record,
        store::{RecordStore, Snapshot},
        validation::FieldRules,
    };

    // === Macros ===
    pub use crate::impl_record;

    // === Storage ===
    pub use crate::storage::{
        BulkOutcome, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, MutationGateway,
        PendingMutation, PreferenceStore, Theme,
    };

    // === Catalog ===
    pub use crate::catalog::{
        Collection, Country, Customer, Dashboard, Order, Product, TeamMember,
    };

    // === Config ===
    pub use crate::config::{CollectionConfig, EngineConfig, GatewayConfig, NotificationConfig};

    // === External dependencies ===
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
