//! Typed error handling for tabula
//!
//! Every failure in the engine is a local, recoverable condition. Callers are
//! expected to surface it (usually as an error notification) and carry on
//! with the store unchanged, since all mutations are all-or-nothing.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: input rejected before a mutation is applied
//! - [`StoreError`]: a snapshot would break the store invariants
//! - [`QueryError`]: a query spec does not fit the record shape
//! - [`MutationError`]: a create/update/delete did not complete
//! - [`ExportError`]: a table export could not be produced
//! - [`ConfigError`]: configuration parsing and loading
//! - [`PersistenceError`]: the key-value persistence surface failed
//!
//! # Example
//!
//! ```rust,ignore
//! match gateway.update("42", json!({"status": "inactive"})).await {
//!     Ok(customer) => println!("updated {}", customer.id()),
//!     Err(MutationError::NotFound { id, .. }) => println!("{} is gone", id),
//!     Err(e) => notifications.report(&e.into()),
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// The main error type for the engine
///
/// Wraps each category so callers can either match precisely or handle any
/// failure uniformly through [`EngineError::error_code`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Serializable error report for presentation layers
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl EngineError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::Validation(e) => e.error_code(),
            EngineError::Store(e) => e.error_code(),
            EngineError::Query(e) => e.error_code(),
            EngineError::Mutation(e) => e.error_code(),
            EngineError::Export(e) => e.error_code(),
            EngineError::Config(_) => "CONFIG_ERROR",
            EngineError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Short title suitable for a notification headline
    pub fn title(&self) -> &'static str {
        match self.error_code() {
            "RECORD_NOT_FOUND" => "Not found",
            "DUPLICATE_IDENTIFIER" | "IDENTIFIER_CONFLICT" => "Duplicate record",
            "SERVICE_UNAVAILABLE" | "GATEWAY_CLOSED" => "Operation failed",
            "CONFIG_ERROR" => "Configuration error",
            code if code.starts_with("EXPORT_") => "Export failed",
            "PERSISTENCE_ERROR" => "Storage error",
            code if code.starts_with("QUERY_") || code.starts_with("UNKNOWN_") => "Invalid query",
            _ => "Validation failed",
        }
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            EngineError::Mutation(MutationError::NotFound { collection, id }) => {
                Some(serde_json::json!({ "collection": collection, "id": id }))
            }
            EngineError::Validation(ValidationError::FieldErrors(errors))
            | EngineError::Mutation(MutationError::Validation(ValidationError::FieldErrors(
                errors,
            ))) => Some(serde_json::json!({ "fields": errors })),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Errors related to input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation failed for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation failed for {} field(s)", .0.len())]
    FieldErrors(Vec<FieldViolation>),

    /// Input does not have the record shape at all
    #[error("Malformed input: {message}")]
    Malformed { message: String },

    /// A record with this identifier already exists
    #[error("{collection} with id '{id}' already exists")]
    IdentifierConflict { collection: String, id: String },

    /// An update tried to change the identifier
    #[error("identifier of '{id}' cannot be changed")]
    ImmutableIdentifier { id: String },
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldError { .. } | ValidationError::FieldErrors(_) => {
                "VALIDATION_ERROR"
            }
            ValidationError::Malformed { .. } => "MALFORMED_INPUT",
            ValidationError::IdentifierConflict { .. } => "IDENTIFIER_CONFLICT",
            ValidationError::ImmutableIdentifier { .. } => "IMMUTABLE_IDENTIFIER",
        }
    }

    /// Names of the fields involved, if any
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldError { field, .. } => vec![field.as_str()],
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.field.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors related to store invariants
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Two records in one snapshot share an identifier
    #[error("{collection} snapshot contains duplicate id '{id}'")]
    DuplicateIdentifier { collection: String, id: String },
}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::DuplicateIdentifier { .. } => "DUPLICATE_IDENTIFIER",
        }
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors related to query specs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Sort key does not name a field of the record shape
    #[error("{collection} cannot be sorted by unknown field '{field}'")]
    UnknownSortKey { collection: String, field: String },

    /// Filter names a field that is not part of the record shape
    #[error("{collection} cannot be filtered by unknown field '{field}'")]
    UnknownFilterField { collection: String, field: String },

    /// Page size must be positive
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// Filter expression could not be parsed
    #[error("malformed filter: {message}")]
    MalformedFilter { message: String },
}

impl QueryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::UnknownSortKey { .. } => "UNKNOWN_SORT_KEY",
            QueryError::UnknownFilterField { .. } => "UNKNOWN_FILTER_FIELD",
            QueryError::InvalidPageSize => "QUERY_INVALID_PAGE_SIZE",
            QueryError::MalformedFilter { .. } => "QUERY_MALFORMED_FILTER",
        }
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors producing a CSV export
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// Column names a field that is not part of the record shape
    #[error("{collection} has no column '{field}'")]
    UnknownColumn { collection: String, field: String },

    #[error("failed to write csv: {message}")]
    Csv { message: String },
}

impl ExportError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ExportError::UnknownColumn { .. } => "EXPORT_UNKNOWN_COLUMN",
            ExportError::Csv { .. } => "EXPORT_FAILED",
        }
    }
}

// =============================================================================
// Mutation Errors
// =============================================================================

/// Errors reported by the mutation gateway
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Target id is absent from the current snapshot
    #[error("{collection} with id '{id}' not found")]
    NotFound { collection: String, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Injected failure during the simulated round trip
    #[error("{operation} on {collection} failed: service unavailable")]
    Unavailable {
        collection: String,
        operation: &'static str,
    },

    /// The gateway worker has stopped
    #[error("{collection} gateway is closed")]
    Closed { collection: String },
}

impl MutationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            MutationError::Validation(e) => e.error_code(),
            MutationError::NotFound { .. } => "RECORD_NOT_FOUND",
            MutationError::Store(e) => e.error_code(),
            MutationError::Export(e) => e.error_code(),
            MutationError::Unavailable { .. } => "SERVICE_UNAVAILABLE",
            MutationError::Closed { .. } => "GATEWAY_CLOSED",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MutationError::NotFound { .. })
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Persistence Errors
// =============================================================================

/// Errors from the key-value persistence surface
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_code_and_message() {
        let err = MutationError::NotFound {
            collection: "customers".to_string(),
            id: "99".to_string(),
        };
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
        assert_eq!(err.to_string(), "customers with id '99' not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_engine_error_delegates_code() {
        let err: EngineError = MutationError::from(ValidationError::Malformed {
            message: "expected object".to_string(),
        })
        .into();
        assert_eq!(err.error_code(), "MALFORMED_INPUT");
        assert_eq!(err.title(), "Validation failed");
    }

    #[test]
    fn test_titles() {
        let err: EngineError = QueryError::InvalidPageSize.into();
        assert_eq!(err.title(), "Invalid query");

        let err: EngineError = StoreError::DuplicateIdentifier {
            collection: "products".to_string(),
            id: "1".to_string(),
        }
        .into();
        assert_eq!(err.title(), "Duplicate record");
    }

    #[test]
    fn test_report_includes_field_details() {
        let err: EngineError = ValidationError::FieldErrors(vec![
            FieldViolation {
                field: "name".to_string(),
                message: "required".to_string(),
            },
            FieldViolation {
                field: "price".to_string(),
                message: "negative".to_string(),
            },
        ])
        .into();

        let report = err.to_report();
        assert_eq!(report.code, "VALIDATION_ERROR");
        let details = report.details.unwrap();
        assert_eq!(details["fields"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_config_parse_message() {
        let err = ConfigError::ParseError {
            file: Some("engine.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse config file 'engine.yaml': bad indent"
        );
    }

    #[test]
    fn test_validation_fields() {
        let err = ValidationError::FieldError {
            field: "email".to_string(),
            message: "invalid".to_string(),
        };
        assert_eq!(err.fields(), vec!["email"]);
    }
}
