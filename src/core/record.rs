//! Record trait defining the shape every stored row exposes

use crate::core::field::FieldValue;
use crate::core::validation::FieldRules;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Base trait for all records held by a [`RecordStore`](crate::core::store::RecordStore).
///
/// A record is an immutable value with:
/// - id: an identifier unique within its store, never changed after creation
/// - fields: a fixed set of named, dynamically readable fields
///
/// Records are plain structs; the serde form is what mutation drafts and
/// patches are merged into, so required fields and field rules use the
/// serialized names. `fields()` names what queries may search, filter and
/// sort on: usually the serialized names, but a field may also be an alias
/// computed from other data (a full name, or a numeric count behind a
/// display label). An alias may shadow a serialized key; queries then read
/// the alias while mutations still write the serialized key.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Store name used in logs, errors and events (e.g., "customers")
    fn collection() -> &'static str;

    /// Get the unique identifier for this record
    fn id(&self) -> &str;

    /// Name of the identifier in the serialized form
    fn id_field() -> &'static str {
        "id"
    }

    /// Every field that can be searched, filtered or sorted
    fn fields() -> &'static [&'static str];

    /// Fields matched by free-text search unless a pipeline overrides them
    fn searchable_fields() -> &'static [&'static str];

    /// Fields that must be present and non-null on create and update
    fn required_fields() -> &'static [&'static str] {
        &[]
    }

    /// Get the value of a specific field by name
    ///
    /// `None` means the record has no value for it, which sorts last.
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Extra validators applied to drafts and merged updates
    fn field_rules() -> FieldRules {
        FieldRules::new()
    }

    /// Whether `field` belongs to the record shape
    fn has_field(field: &str) -> bool {
        Self::fields().contains(&field)
    }
}
