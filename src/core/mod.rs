//! Core module containing the record model, store and query pipeline

pub mod error;
pub mod events;
pub mod export;
pub mod field;
pub mod notification;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod store;
pub mod validation;

pub use error::{
    ConfigError, EngineError, ErrorReport, ExportError, MutationError, PersistenceError, QueryError, StoreError,
    ValidationError,
};
pub use events::{EventBus, EventEnvelope, RecordEvent};
pub use export::{CsvExport, ExportColumn};
pub use field::{FieldFormat, FieldValue};
pub use notification::{Notification, NotificationCenter, NotificationKind};
pub use pipeline::QueryPipeline;
pub use query::{
    DerivedView, FieldFilter, PageWindow, PaginationMeta, QueryParams, QuerySpec, SortDirection,
    SortSpec,
};
pub use record::Record;
pub use store::{RecordStore, Snapshot};
pub use validation::FieldRules;
