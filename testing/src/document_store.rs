//! In-memory ticket collection for fast, deterministic tests.
//!
//! Behaves like the remote store the helpdesk talks to: per-document atomic
//! writes, server-assigned timestamps, and live queries that re-deliver the
//! full matching result set after every commit. Documents are kept in id
//! order, which is the store's native ordering.
//!
//! Fault injection covers the failure paths the helpdesk has to survive:
//! rejected writes, slow writes, and revoked subscriptions.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use futures::channel::mpsc;
use helpdesk_core::document_store::{DocumentStore, TicketPatch, TicketSnapshots, DEFAULT_COLLECTION};
use helpdesk_core::environment::Clock;
use helpdesk_core::error::StoreError;
use helpdesk_core::ticket::{NewTicket, Ticket, TicketDocument, TicketId, TicketStatus};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Snapshot = Result<Vec<Ticket>, StoreError>;

struct LiveQuery {
    status: TicketStatus,
    sender: mpsc::UnboundedSender<Snapshot>,
}

#[derive(Default)]
struct Collection {
    documents: BTreeMap<TicketId, TicketDocument>,
    live_queries: Vec<LiveQuery>,
    next_id: u64,
    update_calls: usize,
    fail_next_update: Option<StoreError>,
    fail_next_query: Option<StoreError>,
    update_latency: Option<Duration>,
}

impl Collection {
    /// Current result set of a live query: matching, well-formed tickets in id order
    fn snapshot(&self, status: TicketStatus) -> Vec<Ticket> {
        self.documents
            .iter()
            .filter(|(_, document)| document.status == status)
            .filter_map(|(id, document)| Ticket::from_document(id.clone(), document.clone()).ok())
            .collect()
    }

    /// Deliver a fresh snapshot to every live query; drops closed ones
    fn notify(&mut self) {
        let snapshots: Vec<(TicketStatus, Vec<Ticket>)> = [TicketStatus::Open, TicketStatus::Closed]
            .into_iter()
            .map(|status| (status, self.snapshot(status)))
            .collect();

        self.live_queries.retain(|query| {
            let snapshot = snapshots
                .iter()
                .find(|(status, _)| *status == query.status)
                .map(|(_, tickets)| tickets.clone())
                .unwrap_or_default();
            query.sender.unbounded_send(Ok(snapshot)).is_ok()
        });
    }
}

/// In-memory document store.
///
/// Cloning shares the underlying collection.
///
/// # Example
///
/// ```
/// use helpdesk_testing::{test_clock, InMemoryDocumentStore};
/// use helpdesk_core::document_store::DocumentStore;
/// use helpdesk_core::ticket::NewTicket;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDocumentStore::new(Arc::new(test_clock()));
/// let id = store.create(NewTicket::new("1234", "no power")?).await?;
///
/// let ticket = store.get(id).await?;
/// assert!(!ticket.is_closed());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    name: String,
    collection: Arc<Mutex<Collection>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDocumentStore {
    /// Create an empty store whose server time comes from `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            name: DEFAULT_COLLECTION.to_string(),
            collection: Arc::new(Mutex::new(Collection::default())),
            clock,
        }
    }

    /// Rename the backing collection
    #[must_use]
    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Seed the store with a ticket (notifies live queries)
    pub fn insert(&self, ticket: &Ticket) {
        self.insert_document(ticket.id.clone(), ticket.to_document());
    }

    /// Seed the store with a raw document, which may violate the ticket invariants
    pub fn insert_document(&self, id: TicketId, document: TicketDocument) {
        let mut collection = self.collection.lock().unwrap();
        collection.documents.insert(id, document);
        collection.notify();
    }

    /// Remove a document (notifies live queries). Returns `true` if it existed.
    pub fn delete(&self, id: &TicketId) -> bool {
        let mut collection = self.collection.lock().unwrap();
        let existed = collection.documents.remove(id).is_some();
        if existed {
            collection.notify();
        }
        existed
    }

    /// Stored document, as persisted
    #[must_use]
    pub fn document(&self, id: &TicketId) -> Option<TicketDocument> {
        self.collection.lock().unwrap().documents.get(id).cloned()
    }

    /// Stored ticket, if present and well-formed
    #[must_use]
    pub fn ticket(&self, id: &TicketId) -> Option<Ticket> {
        self.document(id)
            .and_then(|document| Ticket::from_document(id.clone(), document).ok())
    }

    /// Number of stored documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.collection.lock().unwrap().documents.len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.lock().unwrap().documents.is_empty()
    }

    /// Number of `update` calls received, including rejected ones
    #[must_use]
    pub fn update_calls(&self) -> usize {
        self.collection.lock().unwrap().update_calls
    }

    /// Number of live queries whose consumer is still attached
    #[must_use]
    pub fn live_queries(&self) -> usize {
        self.collection
            .lock()
            .unwrap()
            .live_queries
            .iter()
            .filter(|query| !query.sender.is_closed())
            .count()
    }

    /// Reject the next `update` with `error`, writing nothing
    pub fn fail_next_update(&self, error: StoreError) {
        self.collection.lock().unwrap().fail_next_update = Some(error);
    }

    /// Reject the next `query` with `error`
    pub fn fail_next_query(&self, error: StoreError) {
        self.collection.lock().unwrap().fail_next_query = Some(error);
    }

    /// Delay every subsequent `update` before it commits
    pub fn set_update_latency(&self, latency: Duration) {
        self.collection.lock().unwrap().update_latency = Some(latency);
    }

    /// Fail every live query with a permission error, ending its stream
    pub fn revoke_subscriptions(&self) {
        let queries = std::mem::take(&mut self.collection.lock().unwrap().live_queries);
        for query in queries {
            let _ = query.sender.unbounded_send(Err(StoreError::SubscriptionFailed(
                "permission denied".to_string(),
            )));
        }
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn collection(&self) -> &str {
        &self.name
    }

    fn query(
        &self,
        status: TicketStatus,
    ) -> Pin<Box<dyn Future<Output = Result<TicketSnapshots, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut collection = self.collection.lock().unwrap();
            if let Some(error) = collection.fail_next_query.take() {
                return Err(error);
            }

            let (sender, receiver) = mpsc::unbounded();
            // Initial result set; subsequent ones follow commits in order.
            let _ = sender.unbounded_send(Ok(collection.snapshot(status)));
            collection.live_queries.push(LiveQuery { status, sender });

            Ok(Box::pin(receiver) as TicketSnapshots)
        })
    }

    fn get(&self, id: TicketId) -> Pin<Box<dyn Future<Output = Result<Ticket, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let document = self
                .document(&id)
                .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
            Ticket::from_document(id, document)
        })
    }

    fn create(
        &self,
        ticket: NewTicket,
    ) -> Pin<Box<dyn Future<Output = Result<TicketId, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut collection = self.collection.lock().unwrap();
            collection.next_id += 1;
            let id = TicketId::new(format!("ticket-{:06}", collection.next_id));

            collection
                .documents
                .insert(id.clone(), ticket.into_document(self.clock.now()));
            collection.notify();
            Ok(id)
        })
    }

    fn update(
        &self,
        id: TicketId,
        patch: TicketPatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async move {
            let latency = {
                let mut collection = self.collection.lock().unwrap();
                collection.update_calls += 1;
                collection.update_latency
            };
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }

            let mut collection = self.collection.lock().unwrap();
            if let Some(error) = collection.fail_next_update.take() {
                return Err(error);
            }

            let current = collection
                .documents
                .get(&id)
                .ok_or_else(|| StoreError::NotFound { id: id.clone() })?;
            patch.check(&id, current)?;

            let next = patch.apply(current, self.clock.now());
            collection.documents.insert(id, next);
            collection.notify();
            Ok(())
        })
    }
}
