//! Configuration loading and management

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_CREATE_LATENCY_MS: u64 = 800;
const DEFAULT_UPDATE_LATENCY_MS: u64 = 800;
const DEFAULT_DELETE_LATENCY_MS: u64 = 600;
const DEFAULT_BULK_UPDATE_LATENCY_MS: u64 = 1200;
const DEFAULT_BULK_DELETE_LATENCY_MS: u64 = 800;
const DEFAULT_EXPORT_LATENCY_MS: u64 = 2000;

/// Simulated round-trip latency per mutation kind, in milliseconds
///
/// Unset keys fall back to the dashboard defaults, and stay unset through
/// [`EngineConfig::merge`] so an overlay only changes what it names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_update_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_delete_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_latency_ms: Option<u64>,
}

impl GatewayConfig {
    /// No latency at all, handy for synchronous-feeling tests
    pub fn instant() -> Self {
        Self::uniform(0)
    }

    /// Same latency for every operation
    pub fn uniform(ms: u64) -> Self {
        Self {
            create_latency_ms: Some(ms),
            update_latency_ms: Some(ms),
            delete_latency_ms: Some(ms),
            bulk_update_latency_ms: Some(ms),
            bulk_delete_latency_ms: Some(ms),
            export_latency_ms: Some(ms),
        }
    }

    pub fn create_latency(&self) -> Duration {
        Duration::from_millis(self.create_latency_ms.unwrap_or(DEFAULT_CREATE_LATENCY_MS))
    }

    pub fn update_latency(&self) -> Duration {
        Duration::from_millis(self.update_latency_ms.unwrap_or(DEFAULT_UPDATE_LATENCY_MS))
    }

    pub fn delete_latency(&self) -> Duration {
        Duration::from_millis(self.delete_latency_ms.unwrap_or(DEFAULT_DELETE_LATENCY_MS))
    }

    pub fn bulk_update_latency(&self) -> Duration {
        Duration::from_millis(
            self.bulk_update_latency_ms
                .unwrap_or(DEFAULT_BULK_UPDATE_LATENCY_MS),
        )
    }

    pub fn bulk_delete_latency(&self) -> Duration {
        Duration::from_millis(
            self.bulk_delete_latency_ms
                .unwrap_or(DEFAULT_BULK_DELETE_LATENCY_MS),
        )
    }

    pub fn export_latency(&self) -> Duration {
        Duration::from_millis(self.export_latency_ms.unwrap_or(DEFAULT_EXPORT_LATENCY_MS))
    }

    /// Keys set in `other` win, the rest keep their current value
    pub fn overlay(self, other: GatewayConfig) -> Self {
        Self {
            create_latency_ms: other.create_latency_ms.or(self.create_latency_ms),
            update_latency_ms: other.update_latency_ms.or(self.update_latency_ms),
            delete_latency_ms: other.delete_latency_ms.or(self.delete_latency_ms),
            bulk_update_latency_ms: other.bulk_update_latency_ms.or(self.bulk_update_latency_ms),
            bulk_delete_latency_ms: other.bulk_delete_latency_ms.or(self.bulk_delete_latency_ms),
            export_latency_ms: other.export_latency_ms.or(self.export_latency_ms),
        }
    }
}

/// Per-collection query settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name (e.g., "customers", "products")
    pub name: String,

    /// Overrides the record's default searchable fields
    #[serde(default)]
    pub search_fields: Option<Vec<String>>,

    /// Page size applied when a query has no window
    #[serde(default)]
    pub default_page_size: Option<usize>,
}

impl CollectionConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search_fields: None,
            default_page_size: None,
        }
    }
}

/// Notification list settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Oldest entries beyond this count are dropped; unbounded when absent
    #[serde(default)]
    pub max_retained: Option<usize>,
}

/// Complete configuration for the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub collections: Vec<CollectionConfig>,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;

        Self::parse(&content, Some(path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, None)
    }

    fn parse(yaml: &str, file: Option<&str>) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: file.map(str::to_string),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.notifications.max_retained == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "notifications.max_retained".to_string(),
                value: "0".to_string(),
                message: "at least one notification must be retained".to_string(),
            });
        }
        for collection in &self.collections {
            if collection.default_page_size == Some(0) {
                return Err(ConfigError::InvalidValue {
                    field: format!("collections.{}.default_page_size", collection.name),
                    value: "0".to_string(),
                    message: "page size must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Settings for a collection, falling back to defaults
    pub fn collection(&self, name: &str) -> CollectionConfig {
        self.collections
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .unwrap_or_else(|| CollectionConfig::named(name))
    }

    /// Merge several configurations
    ///
    /// Later configurations win key by key: gateway latencies and the
    /// notification cap only change when the later file sets them, and a
    /// collection with the same name replaces the earlier entry in place.
    pub fn merge(configs: Vec<EngineConfig>) -> Self {
        let mut merged = EngineConfig::default();

        for config in configs {
            merged.gateway = merged.gateway.overlay(config.gateway);
            merged.notifications.max_retained = config
                .notifications
                .max_retained
                .or(merged.notifications.max_retained);

            for collection in config.collections {
                match merged.collections.iter_mut().find(|c| c.name == collection.name) {
                    Some(existing) => *existing = collection,
                    None => merged.collections.push(collection),
                }
            }
        }

        merged
    }

    /// Configuration matching the dashboard's table views
    pub fn default_config() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            collections: vec![
                CollectionConfig {
                    name: "products".to_string(),
                    search_fields: None,
                    default_page_size: Some(10),
                },
                CollectionConfig {
                    name: "customers".to_string(),
                    search_fields: None,
                    default_page_size: Some(10),
                },
                CollectionConfig {
                    name: "orders".to_string(),
                    search_fields: None,
                    default_page_size: Some(10),
                },
                CollectionConfig::named("countries"),
                CollectionConfig {
                    name: "team_members".to_string(),
                    search_fields: None,
                    default_page_size: Some(25),
                },
            ],
            notifications: NotificationConfig::default(),
        }
    }
}
