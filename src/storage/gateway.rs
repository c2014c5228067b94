//! Latency-simulating create/update/delete against a record store
//!
//! # Architecture
//!
//! ```text
//! caller ──create/update/delete/export──▶ mpsc (FIFO) ──▶ worker task ──validate──▶ sleep(latency)
//!   ▲                                                                          │
//!   └──────────── PendingMutation (oneshot) ◀── reply ◀── publish ◀── RecordStore::replace
//! ```
//!
//! One worker per store is the only writer, so mutations apply strictly in
//! the order they were issued. Each one builds a whole new snapshot from the
//! current one and swaps it in, which keeps concurrent queries consistent.

use crate::config::GatewayConfig;
use crate::core::error::{MutationError, ValidationError};
use crate::core::events::{EventBus, RecordEvent};
use crate::core::export::{self, CsvExport, ExportColumn};
use crate::core::record::Record;
use crate::core::store::{RecordStore, Snapshot};
use crate::core::validation::FieldRules;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

type Reply<T> = oneshot::Sender<Result<T, MutationError>>;

enum Command<R> {
    Create {
        draft: Value,
        reply: Reply<R>,
    },
    Update {
        id: String,
        patch: Value,
        reply: Reply<R>,
    },
    Delete {
        id: String,
        reply: Reply<()>,
    },
    BulkUpdate {
        ids: Vec<String>,
        patch: Value,
        reply: Reply<BulkOutcome>,
    },
    BulkDelete {
        ids: Vec<String>,
        reply: Reply<BulkOutcome>,
    },
    Export {
        ids: Option<Vec<String>>,
        columns: Vec<ExportColumn>,
        reply: Reply<CsvExport>,
    },
}

/// Result of a bulk operation
///
/// Ids absent from the store are skipped rather than failing the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    /// Ids that were updated or deleted, in store order
    pub affected: Vec<String>,
    /// Requested ids that were not in the store
    pub skipped: Vec<String>,
}

/// Eventual result of an issued mutation
///
/// The mutation is already queued when this is returned. Dropping it
/// abandons the result but does not cancel the mutation.
pub struct PendingMutation<T> {
    rx: oneshot::Receiver<Result<T, MutationError>>,
    collection: &'static str,
}

impl<T> Future for PendingMutation<T> {
    type Output = Result<T, MutationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let collection = self.collection;
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(MutationError::Closed {
                    collection: collection.to_string(),
                })
            })
        })
    }
}

/// Asynchronous create/update/delete front for one record store
///
/// Cloning yields another handle to the same worker.
#[derive(Clone)]
pub struct MutationGateway<R: Record> {
    store: RecordStore<R>,
    commands: mpsc::UnboundedSender<Command<R>>,
    faults: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
}

impl<R: Record> MutationGateway<R> {
    /// Start the worker for a store
    ///
    /// Must be called from within a tokio runtime. The worker stops once
    /// every handle to the gateway is dropped.
    pub fn spawn(store: RecordStore<R>, config: GatewayConfig) -> Self {
        Self::spawn_inner(store, config, None)
    }

    /// Start the worker and publish a [`RecordEvent`] for every applied change
    pub fn spawn_with_events(store: RecordStore<R>, config: GatewayConfig, events: EventBus) -> Self {
        Self::spawn_inner(store, config, Some(events))
    }

    fn spawn_inner(store: RecordStore<R>, config: GatewayConfig, events: Option<EventBus>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let faults = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));

        let worker = Worker {
            store: store.clone(),
            config,
            events,
            faults: Arc::clone(&faults),
            in_flight: Arc::clone(&in_flight),
        };
        tokio::spawn(worker.run(rx));

        Self {
            store,
            commands,
            faults,
            in_flight,
        }
    }

    /// The store this gateway writes to
    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    /// Create a record from a JSON draft
    ///
    /// A uuid is assigned when the draft has no id.
    pub fn create(&self, draft: Value) -> PendingMutation<R> {
        self.issue(|reply| Command::Create { draft, reply })
    }

    /// Merge a JSON patch over an existing record
    pub fn update(&self, id: impl Into<String>, patch: Value) -> PendingMutation<R> {
        let id = id.into();
        self.issue(|reply| Command::Update { id, patch, reply })
    }

    /// Remove a record
    pub fn delete(&self, id: impl Into<String>) -> PendingMutation<()> {
        let id = id.into();
        self.issue(|reply| Command::Delete { id, reply })
    }

    /// Apply one patch to every listed record that exists
    pub fn bulk_update<I, S>(&self, ids: I, patch: Value) -> PendingMutation<BulkOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids.into_iter().map(Into::into).collect();
        self.issue(|reply| Command::BulkUpdate { ids, patch, reply })
    }

    /// Remove every listed record that exists
    pub fn bulk_delete<I, S>(&self, ids: I) -> PendingMutation<BulkOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids.into_iter().map(Into::into).collect();
        self.issue(|reply| Command::BulkDelete { ids, reply })
    }

    /// Export records as CSV after the simulated round trip
    ///
    /// Queued with the mutations, so the file reflects every change issued
    /// before it. `None` exports the whole store; listed ids are exported in
    /// store order and unknown ids are left out.
    pub fn export(&self, ids: Option<Vec<String>>, columns: Vec<ExportColumn>) -> PendingMutation<CsvExport> {
        self.issue(|reply| Command::Export { ids, columns, reply })
    }

    /// Make the next `count` mutations fail after their latency
    pub fn inject_faults(&self, count: usize) {
        self.faults.fetch_add(count, Ordering::SeqCst);
    }

    /// Injected faults not yet consumed
    pub fn pending_faults(&self) -> usize {
        self.faults.load(Ordering::SeqCst)
    }

    /// Mutations issued but not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Whether a loading indicator should be shown
    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    fn issue<T>(&self, command: impl FnOnce(Reply<T>) -> Command<R>) -> PendingMutation<T> {
        let (reply, rx) = oneshot::channel();
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if self.commands.send(command(reply)).is_err() {
            // The reply sender was dropped with the command, so the pending
            // mutation resolves to Closed.
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!(collection = R::collection(), "mutation issued to a stopped gateway");
        }
        PendingMutation {
            rx,
            collection: R::collection(),
        }
    }
}

struct Worker<R> {
    store: RecordStore<R>,
    config: GatewayConfig,
    events: Option<EventBus>,
    faults: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
}

impl<R: Record> Worker<R> {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command<R>>) {
        tracing::debug!(collection = R::collection(), "mutation worker started");

        while let Some(command) = rx.recv().await {
            self.handle(command).await;
        }

        tracing::debug!(collection = R::collection(), "mutation worker stopped");
    }

    async fn handle(&self, command: Command<R>) {
        match command {
            Command::Create { draft, reply } => {
                self.respond("create", reply, self.create(draft).await);
            }
            Command::Update { id, patch, reply } => {
                self.respond("update", reply, self.update(id, patch).await);
            }
            Command::Delete { id, reply } => {
                self.respond("delete", reply, self.delete(id).await);
            }
            Command::BulkUpdate { ids, patch, reply } => {
                self.respond("bulk_update", reply, self.bulk_update(ids, patch).await);
            }
            Command::BulkDelete { ids, reply } => {
                self.respond("bulk_delete", reply, self.bulk_delete(ids).await);
            }
            Command::Export { ids, columns, reply } => {
                self.respond("export", reply, self.export(ids, columns).await);
            }
        }
    }

    /// Settle a command: the busy count drops before the caller is woken
    fn respond<T>(&self, operation: &str, reply: Reply<T>, result: Result<T, MutationError>) {
        match &result {
            Ok(_) => tracing::debug!(collection = R::collection(), operation, "mutation applied"),
            Err(e) => tracing::warn!(
                collection = R::collection(),
                operation,
                code = e.error_code(),
                "mutation rejected: {}",
                e
            ),
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        // A send error only means the caller abandoned the result
        let _ = reply.send(result);
    }

    async fn create(&self, draft: Value) -> Result<R, MutationError> {
        let record = prepare_create::<R>(draft)?;
        ensure_absent(&self.store.snapshot(), record.id())?;

        self.round_trip("create", self.config.create_latency()).await?;

        let snapshot = self.store.snapshot();
        ensure_absent(&snapshot, record.id())?;
        let mut next = snapshot.to_vec();
        next.push(record.clone());
        let installed = self.store.replace(next)?;

        self.publish(
            RecordEvent::Created {
                collection: R::collection().to_string(),
                record_id: record.id().to_string(),
                data: to_json(&record),
            },
            installed.version(),
        );
        Ok(record)
    }

    async fn update(&self, id: String, patch: Value) -> Result<R, MutationError> {
        let patch = patch_object::<R>(patch, Some(&id))?;
        {
            let snapshot = self.store.snapshot();
            let existing = snapshot.get(&id).ok_or_else(|| not_found::<R>(&id))?;
            merge(existing, &patch)?;
        }

        self.round_trip("update", self.config.update_latency()).await?;

        let snapshot = self.store.snapshot();
        let position = snapshot.position(&id).ok_or_else(|| not_found::<R>(&id))?;
        let updated = merge(&snapshot[position], &patch)?;
        let mut next = snapshot.to_vec();
        next[position] = updated.clone();
        let installed = self.store.replace(next)?;

        self.publish(
            RecordEvent::Updated {
                collection: R::collection().to_string(),
                record_id: id,
                data: to_json(&updated),
            },
            installed.version(),
        );
        Ok(updated)
    }

    async fn delete(&self, id: String) -> Result<(), MutationError> {
        if !self.store.snapshot().contains(&id) {
            return Err(not_found::<R>(&id));
        }

        self.round_trip("delete", self.config.delete_latency()).await?;

        let snapshot = self.store.snapshot();
        let position = snapshot.position(&id).ok_or_else(|| not_found::<R>(&id))?;
        let mut next = snapshot.to_vec();
        next.remove(position);
        let installed = self.store.replace(next)?;

        self.publish(
            RecordEvent::Deleted {
                collection: R::collection().to_string(),
                record_id: id,
            },
            installed.version(),
        );
        Ok(())
    }

    async fn bulk_update(&self, ids: Vec<String>, patch: Value) -> Result<BulkOutcome, MutationError> {
        let patch = patch_object::<R>(patch, None)?;
        {
            let snapshot = self.store.snapshot();
            for id in &ids {
                if let Some(existing) = snapshot.get(id) {
                    merge(existing, &patch)?;
                }
            }
        }

        self.round_trip("bulk_update", self.config.bulk_update_latency()).await?;

        let snapshot = self.store.snapshot();
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut affected = Vec::new();
        let mut next = Vec::with_capacity(snapshot.len());
        for record in snapshot.iter() {
            if wanted.contains(record.id()) {
                let updated = merge(record, &patch)?;
                affected.push(updated.clone());
                next.push(updated);
            } else {
                next.push(record.clone());
            }
        }

        let outcome = outcome(&snapshot, &ids, affected.iter().map(|r| r.id()));
        if !affected.is_empty() {
            let installed = self.store.replace(next)?;
            for record in &affected {
                self.publish(
                    RecordEvent::Updated {
                        collection: R::collection().to_string(),
                        record_id: record.id().to_string(),
                        data: to_json(record),
                    },
                    installed.version(),
                );
            }
        }
        Ok(outcome)
    }

    async fn bulk_delete(&self, ids: Vec<String>) -> Result<BulkOutcome, MutationError> {
        self.round_trip("bulk_delete", self.config.bulk_delete_latency()).await?;

        let snapshot = self.store.snapshot();
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let (removed, kept): (Vec<&R>, Vec<&R>) =
            snapshot.iter().partition(|record| wanted.contains(record.id()));

        let outcome = outcome(&snapshot, &ids, removed.iter().map(|r| r.id()));
        if !removed.is_empty() {
            let installed = self.store.replace(kept.into_iter().cloned().collect())?;
            for id in &outcome.affected {
                self.publish(
                    RecordEvent::Deleted {
                        collection: R::collection().to_string(),
                        record_id: id.clone(),
                    },
                    installed.version(),
                );
            }
        }
        Ok(outcome)
    }

    /// Simulated network round trip; consumes one injected fault if armed
    async fn export(&self, ids: Option<Vec<String>>, columns: Vec<ExportColumn>) -> Result<CsvExport, MutationError> {
        // Bad columns fail before the delay
        export::write_csv::<R>(&[], &columns)?;

        self.round_trip("export", self.config.export_latency()).await?;

        let snapshot = self.store.snapshot();
        let records: Vec<R> = match ids {
            Some(ids) => {
                let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
                snapshot
                    .iter()
                    .filter(|record| wanted.contains(record.id()))
                    .cloned()
                    .collect()
            }
            None => snapshot.to_vec(),
        };
        Ok(export::export_csv(&records, &columns)?)
    }

    async fn round_trip(&self, operation: &'static str, latency: Duration) -> Result<(), MutationError> {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let faulted = self
            .faults
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if faulted {
            tracing::warn!(collection = R::collection(), operation, "injected fault");
            return Err(MutationError::Unavailable {
                collection: R::collection().to_string(),
                operation,
            });
        }
        Ok(())
    }

    fn publish(&self, event: RecordEvent, version: u64) {
        if let Some(events) = &self.events {
            events.publish(event, version);
        }
    }
}

fn not_found<R: Record>(id: &str) -> MutationError {
    MutationError::NotFound {
        collection: R::collection().to_string(),
        id: id.to_string(),
    }
}

fn ensure_absent<R: Record>(snapshot: &Snapshot<R>, id: &str) -> Result<(), ValidationError> {
    if snapshot.contains(id) {
        return Err(ValidationError::IdentifierConflict {
            collection: R::collection().to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn to_json<R: Record>(record: &R) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}

fn rules<R: Record>() -> FieldRules {
    FieldRules::new()
        .required(R::required_fields())
        .extend(R::field_rules())
}

/// Validate a draft and turn it into a record, assigning an id if needed
fn prepare_create<R: Record>(draft: Value) -> Result<R, ValidationError> {
    let Value::Object(mut object) = draft else {
        return Err(ValidationError::Malformed {
            message: "a draft must be a JSON object".to_string(),
        });
    };

    let id = match object.get(R::id_field()) {
        None | Some(Value::Null) => Uuid::new_v4().to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => Uuid::new_v4().to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(ValidationError::Malformed {
                message: format!("'{}' cannot be used as an id", other),
            });
        }
    };
    object.insert(R::id_field().to_string(), Value::String(id));

    rules::<R>().check(&object)?;
    serde_json::from_value(Value::Object(object)).map_err(|e| ValidationError::Malformed {
        message: e.to_string(),
    })
}

/// Check a patch is an object that leaves the identifier alone
fn patch_object<R: Record>(patch: Value, id: Option<&str>) -> Result<Map<String, Value>, ValidationError> {
    let Value::Object(object) = patch else {
        return Err(ValidationError::Malformed {
            message: "a patch must be a JSON object".to_string(),
        });
    };

    if let Some(new_id) = object.get(R::id_field()) {
        let unchanged = matches!((new_id, id), (Value::String(s), Some(id)) if s == id);
        if !unchanged {
            return Err(ValidationError::ImmutableIdentifier {
                id: id.unwrap_or_default().to_string(),
            });
        }
    }
    Ok(object)
}

/// Merge patch fields over a record and validate the result
fn merge<R: Record>(existing: &R, patch: &Map<String, Value>) -> Result<R, ValidationError> {
    let Value::Object(mut object) = to_json(existing) else {
        return Err(ValidationError::Malformed {
            message: format!("{} records do not serialize to objects", R::collection()),
        });
    };
    for (key, value) in patch {
        object.insert(key.clone(), value.clone());
    }

    rules::<R>().check(&object)?;
    serde_json::from_value(Value::Object(object)).map_err(|e| ValidationError::Malformed {
        message: e.to_string(),
    })
}

fn outcome<'a, R: Record>(
    snapshot: &Snapshot<R>,
    requested: &[String],
    affected: impl Iterator<Item = &'a str>,
) -> BulkOutcome {
    let mut seen = HashSet::new();
    let skipped = requested
        .iter()
        .filter(|id| !snapshot.contains(id) && seen.insert(id.as_str()))
        .cloned()
        .collect();

    BulkOutcome {
        affected: affected.map(str::to_string).collect(),
        skipped,
    }
}
