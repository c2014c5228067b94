//! Write path and persistence surfaces

pub mod gateway;
pub mod preferences;

pub use gateway::{BulkOutcome, MutationGateway, PendingMutation};
pub use preferences::{
    CartItem, CartSummary, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PreferenceStore,
    Preferences, Theme,
};
