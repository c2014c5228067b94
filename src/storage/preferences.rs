//! Persisted user preferences: theme, shopping cart and wishlist
//!
//! Preferences live behind a small [`KeyValueStore`] so the same logic runs
//! against memory in tests and against a directory of files otherwise. Each
//! preference has its own key, and every change rewrites only that key.

use crate::catalog::Product;
use crate::core::error::PersistenceError;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

pub const THEME_KEY: &str = "theme";
pub const CART_KEY: &str = "xenith_cart";
pub const WISHLIST_KEY: &str = "xenith_wishlist";

/// Orders above this subtotal ship for free
pub const FREE_SHIPPING_THRESHOLD: f64 = 100.0;
pub const SHIPPING_FEE: f64 = 9.99;

/// String key-value persistence
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory key-value store
///
/// Cloning yields another handle to the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Key-value store keeping one `<key>.json` file per key in a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open a directory, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| PersistenceError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        std::fs::write(self.path(key), value).map_err(|source| PersistenceError::Io {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(PersistenceError::Io {
                key: key.to_string(),
                source: e,
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Derived cart totals, rounded to cents
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
}

/// Everything that survives a restart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub theme: Theme,
    pub cart: Vec<CartItem>,
    pub wishlist: IndexSet<String>,
}

/// Preferences bound to a persistence backend
pub struct PreferenceStore<S> {
    backend: S,
    prefs: Preferences,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    /// Read every preference from the backend
    ///
    /// Missing or unreadable values fall back to their defaults.
    pub fn load(backend: S) -> Self {
        let theme = match backend.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(key = THEME_KEY, value = %raw, "unknown theme, using default");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!(key = THEME_KEY, error = %e, "failed to read theme");
                Theme::default()
            }
        };

        let prefs = Preferences {
            theme,
            cart: load_json(&backend, CART_KEY),
            wishlist: load_json(&backend, WISHLIST_KEY),
        };
        tracing::debug!(
            theme = prefs.theme.as_str(),
            cart = prefs.cart.len(),
            wishlist = prefs.wishlist.len(),
            "preferences loaded"
        );

        Self { backend, prefs }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn theme(&self) -> Theme {
        self.prefs.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), PersistenceError> {
        self.prefs.theme = theme;
        self.backend.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, PersistenceError> {
        let theme = self.prefs.theme.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub fn cart(&self) -> &[CartItem] {
        &self.prefs.cart
    }

    /// Add one unit of a product, capped at its stock
    pub fn add_to_cart(&mut self, product: &Product) -> Result<(), PersistenceError> {
        match self.prefs.cart.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => item.quantity = (item.quantity + 1).min(product.stock_count),
            None => self.prefs.cart.push(CartItem {
                product: product.clone(),
                quantity: 1,
                selected_size: None,
                selected_color: None,
                added_at: Utc::now(),
            }),
        }
        self.save_cart()
    }

    /// Set a cart line's quantity; zero removes the line
    ///
    /// Returns false if the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<bool, PersistenceError> {
        if quantity == 0 {
            return self.remove_from_cart(product_id);
        }

        match self.prefs.cart.iter_mut().find(|item| item.product.id == product_id) {
            Some(item) => {
                item.quantity = quantity.min(item.product.stock_count);
                self.save_cart()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<bool, PersistenceError> {
        let before = self.prefs.cart.len();
        self.prefs.cart.retain(|item| item.product.id != product_id);
        if self.prefs.cart.len() == before {
            return Ok(false);
        }
        self.save_cart()?;
        Ok(true)
    }

    pub fn clear_cart(&mut self) -> Result<(), PersistenceError> {
        self.prefs.cart.clear();
        self.save_cart()
    }

    pub fn cart_summary(&self) -> CartSummary {
        let item_count = self.prefs.cart.iter().map(|item| item.quantity).sum();
        let subtotal = round_cents(
            self.prefs
                .cart
                .iter()
                .map(|item| item.product.price * f64::from(item.quantity))
                .sum(),
        );
        let shipping = if self.prefs.cart.is_empty() || subtotal > FREE_SHIPPING_THRESHOLD {
            0.0
        } else {
            SHIPPING_FEE
        };

        CartSummary {
            item_count,
            subtotal,
            shipping,
            total: round_cents(subtotal + shipping),
        }
    }

    pub fn wishlist(&self) -> &IndexSet<String> {
        &self.prefs.wishlist
    }

    /// Add or remove a product; returns whether it is now wishlisted
    pub fn toggle_wishlist(&mut self, product_id: &str) -> Result<bool, PersistenceError> {
        let added = if self.prefs.wishlist.shift_remove(product_id) {
            false
        } else {
            self.prefs.wishlist.insert(product_id.to_string());
            true
        };
        save_json(&self.backend, WISHLIST_KEY, &self.prefs.wishlist)?;
        Ok(added)
    }

    pub fn is_wishlisted(&self, product_id: &str) -> bool {
        self.prefs.wishlist.contains(product_id)
    }

    fn save_cart(&self) -> Result<(), PersistenceError> {
        save_json(&self.backend, CART_KEY, &self.prefs.cart)
    }
}

fn load_json<S: KeyValueStore, T: serde::de::DeserializeOwned + Default>(backend: &S, key: &str) -> T {
    match backend.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "corrupt preference, using default");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read preference");
            T::default()
        }
    }
}

fn save_json<S: KeyValueStore, T: Serialize>(backend: &S, key: &str, value: &T) -> Result<(), PersistenceError> {
    let encoded = serde_json::to_string(value).map_err(|source| PersistenceError::Encode {
        key: key.to_string(),
        source,
    })?;
    backend.set(key, &encoded)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
