//! Wiring of every dashboard collection
//!
//! # Architecture
//!
//! ```text
//! Dashboard
//!   ├── Collection<Customer>   ─┐
//!   ├── Collection<Product>     │  store ◀── pipeline (reads)
//!   ├── Collection<Order>       ├─ store ◀── gateway  (writes) ──▶ EventBus
//!   ├── Collection<Country>     │
//!   ├── Collection<TeamMember> ─┘
//!   └── NotificationCenter ◀── report(error)
//! ```

use crate::catalog::{Country, Customer, Order, Product, TeamMember, seed};
use crate::config::EngineConfig;
use crate::core::error::{EngineError, StoreError};
use crate::core::events::EventBus;
use crate::core::notification::{Notification, NotificationCenter};
use crate::core::pipeline::QueryPipeline;
use crate::core::query::{DerivedView, QueryParams, QuerySpec};
use crate::core::record::Record;
use crate::core::store::RecordStore;
use crate::storage::gateway::MutationGateway;

/// One record store with its read and write paths
#[derive(Clone)]
pub struct Collection<R: Record> {
    store: RecordStore<R>,
    pipeline: QueryPipeline<R>,
    gateway: MutationGateway<R>,
}

impl<R: Record> Collection<R> {
    /// Build a collection over seed records
    ///
    /// Spawns the mutation worker, so this must run inside a tokio runtime.
    pub fn new(records: Vec<R>, config: &EngineConfig, events: EventBus) -> Result<Self, StoreError> {
        let store = RecordStore::with_records(records)?;
        let pipeline = QueryPipeline::from_config(store.clone(), &config.collection(R::collection()));
        let gateway = MutationGateway::spawn_with_events(store.clone(), config.gateway.clone(), events);

        Ok(Self {
            store,
            pipeline,
            gateway,
        })
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    pub fn pipeline(&self) -> &QueryPipeline<R> {
        &self.pipeline
    }

    pub fn gateway(&self) -> &MutationGateway<R> {
        &self.gateway
    }

    /// Run a spec, applying the collection's default page size if it has none
    pub fn query(&self, spec: QuerySpec) -> Result<DerivedView<R>, EngineError> {
        Ok(self.pipeline.run(&self.pipeline.page_spec(spec))?)
    }

    /// Run URL-style query parameters
    pub fn query_params(&self, params: &QueryParams) -> Result<DerivedView<R>, EngineError> {
        Ok(self.pipeline.run(&QuerySpec::from_params(params)?)?)
    }
}

/// Every collection of the admin dashboard plus shared services
#[derive(Clone)]
pub struct Dashboard {
    pub customers: Collection<Customer>,
    pub products: Collection<Product>,
    pub orders: Collection<Order>,
    pub countries: Collection<Country>,
    pub team_members: Collection<TeamMember>,
    pub notifications: NotificationCenter,
    pub events: EventBus,
}

impl Dashboard {
    /// Build the dashboard over its seed data
    pub fn seeded(config: &EngineConfig) -> Result<Self, EngineError> {
        let events = EventBus::default();
        let notifications = match config.notifications.max_retained {
            Some(max) => NotificationCenter::with_capacity_limit(max),
            None => NotificationCenter::new(),
        }
        .with_seed(seed::notifications());

        let dashboard = Self {
            customers: Collection::new(seed::customers(), config, events.clone())?,
            products: Collection::new(seed::products(), config, events.clone())?,
            orders: Collection::new(seed::orders(), config, events.clone())?,
            countries: Collection::new(seed::countries(), config, events.clone())?,
            team_members: Collection::new(seed::team_members(), config, events.clone())?,
            notifications,
            events,
        };

        tracing::info!(
            customers = dashboard.customers.store().len(),
            products = dashboard.products.store().len(),
            orders = dashboard.orders.store().len(),
            "dashboard seeded"
        );
        Ok(dashboard)
    }

    /// Surface a failed operation in the notification list
    pub fn report(&self, error: impl Into<EngineError>) -> Notification {
        self.notifications.report(&error.into())
    }

    /// Whether any collection has a mutation in flight
    pub fn is_busy(&self) -> bool {
        self.customers.gateway().is_busy()
            || self.products.gateway().is_busy()
            || self.orders.gateway().is_busy()
            || self.countries.gateway().is_busy()
            || self.team_members.gateway().is_busy()
    }
}
