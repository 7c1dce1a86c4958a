//! Document store abstraction for the ticket collection.
//!
//! The store holds one document per ticket in a single collection (`orders`
//! by default). It offers one-shot reads, atomic per-document writes, and
//! live queries that re-deliver the full matching result set on every
//! committed change.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   query(filter)   ┌─────────────────┐
//! │ Ticket List  │ ◄──── snapshots ─ │                 │
//! │ Synchronizer │                   │                 │
//! └──────────────┘                   │  DocumentStore  │
//! ┌──────────────┐   get(id)         │   (remote)      │
//! │ Detail Loader│ ◄──────────────── │                 │
//! └──────────────┘                   │                 │
//! ┌──────────────┐   update(id, ..)  │                 │
//! │ Ticket Closer│ ────────────────► │                 │
//! └──────────────┘                   └─────────────────┘
//! ```
//!
//! # Guarantees expected from implementations
//!
//! - **Atomic updates**: every field of a [`TicketPatch`] is written, or none is
//! - **Ordered delivery**: snapshots of one live query arrive in commit order
//! - **Native ordering**: snapshot items keep the store's ordering; consumers never re-sort
//! - **Server time**: [`Timestamp::Server`] is resolved by the store at commit
//!
//! # Implementations
//!
//! - `InMemoryDocumentStore` (helpdesk-testing) - in-memory collection with fault injection
//!
//! # Dyn Compatibility
//!
//! This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
//! to enable trait object usage (`Arc<dyn DocumentStore>`), which reducers
//! capture inside effects.

use crate::error::StoreError;
use crate::ticket::{NewTicket, Ticket, TicketDocument, TicketId, TicketStatus};
use chrono::{DateTime, Utc};
use futures::Stream;
use std::future::Future;
use std::pin::Pin;

/// Name of the ticket collection.
pub const DEFAULT_COLLECTION: &str = "orders";

/// Stream of live-query snapshots.
///
/// Every item is the complete, natively ordered result set after a commit.
/// An `Err` item means the subscription failed (e.g. permission revoked);
/// no further items follow it.
pub type TicketSnapshots = Pin<Box<dyn Stream<Item = Result<Vec<Ticket>, StoreError>> + Send>>;

/// Timestamp value written by an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timestamp {
    /// Assigned by the store at commit time
    Server,
    /// Explicit value
    At(DateTime<Utc>),
}

impl Timestamp {
    /// Resolve against the store's commit time
    #[must_use]
    pub const fn resolve(self, server_now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Server => server_now,
            Self::At(at) => at,
        }
    }
}

/// Partial update of a ticket document.
///
/// Unset fields are left untouched. `expected_status` is a precondition: if
/// set and the stored status differs, the store rejects the update with
/// [`StoreError::PreconditionFailed`] and writes nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketPatch {
    /// New status
    pub status: Option<TicketStatus>,
    /// New solution text
    pub solution: Option<String>,
    /// New close time
    pub closed_at: Option<Timestamp>,
    /// Required current status
    pub expected_status: Option<TicketStatus>,
}

impl TicketPatch {
    /// The close transition: `status=closed`, `solution`, `closed_at=server time`,
    /// only if the ticket is still open.
    #[must_use]
    pub fn close(solution: impl Into<String>) -> Self {
        Self {
            status: Some(TicketStatus::Closed),
            solution: Some(solution.into()),
            closed_at: Some(Timestamp::Server),
            expected_status: Some(TicketStatus::Open),
        }
    }

    /// Check the precondition against the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PreconditionFailed`] if the stored status differs
    /// from `expected_status`.
    pub fn check(&self, id: &TicketId, current: &TicketDocument) -> Result<(), StoreError> {
        match self.expected_status {
            Some(expected) if expected != current.status => Err(StoreError::PreconditionFailed {
                id: id.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Produce the updated document; `server_now` resolves server timestamps.
    #[must_use]
    pub fn apply(&self, current: &TicketDocument, server_now: DateTime<Utc>) -> TicketDocument {
        let mut next = current.clone();
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(solution) = &self.solution {
            next.solution.clone_from(solution);
        }
        if let Some(closed_at) = self.closed_at {
            next.closed_at = Some(closed_at.resolve(server_now));
        }
        next
    }
}

/// Ticket store client.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; they are shared between screens
/// and captured inside effects.
pub trait DocumentStore: Send + Sync {
    /// Name of the backing collection.
    fn collection(&self) -> &str {
        DEFAULT_COLLECTION
    }

    /// Open a live query over all tickets with `status`.
    ///
    /// The returned stream yields the current result set first, then one
    /// snapshot per committed change, until it is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SubscriptionFailed`] if the query cannot be established.
    fn query(
        &self,
        status: TicketStatus,
    ) -> Pin<Box<dyn Future<Output = Result<TicketSnapshots, StoreError>> + Send + '_>>;

    /// Fetch one ticket.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`]: no such document
    /// - [`StoreError::MalformedDocument`]: the document violates the ticket invariants
    fn get(&self, id: TicketId) -> Pin<Box<dyn Future<Output = Result<Ticket, StoreError>> + Send + '_>>;

    /// Create an open ticket and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CommitFailed`] if the write is rejected.
    fn create(
        &self,
        ticket: NewTicket,
    ) -> Pin<Box<dyn Future<Output = Result<TicketId, StoreError>> + Send + '_>>;

    /// Atomically apply `patch` to one document.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`]: no such document
    /// - [`StoreError::PreconditionFailed`]: `expected_status` did not hold
    /// - [`StoreError::CommitFailed`]: the write was rejected
    fn update(
        &self,
        id: TicketId,
        patch: TicketPatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}
