//! Ticket Closer.
//!
//! Commits the only transition a ticket has: `open --close(solution)--> closed`.
//! `closed` is terminal.
//!
//! A close is one atomic update that writes `status`, `solution` and a
//! server-assigned `closed_at` together, guarded by a `status == open`
//! precondition, so a ticket is closed at most once and `closed_at` is never
//! overwritten. A second close of the same ticket while the first is still
//! in flight fails fast with [`CloseError::AlreadyClosed`].

use crate::error::CloseError;
use helpdesk_core::document_store::{DocumentStore, TicketPatch};
use helpdesk_core::error::{StoreError, ValidationError};
use helpdesk_core::ticket::TicketId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Default time to wait for the store to commit a close
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Validates and commits the close transition.
pub struct TicketCloser {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
    in_flight: Arc<Mutex<HashSet<TicketId>>>,
}

impl TicketCloser {
    /// Create a closer with the default commit timeout
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_timeout(store, DEFAULT_CLOSE_TIMEOUT)
    }

    /// Create a closer that gives up on the store after `timeout`
    #[must_use]
    pub fn with_timeout(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Close `id` with `solution`.
    ///
    /// Does not re-fetch the ticket; callers needing fresh data reload it.
    ///
    /// A timeout only stops waiting: the store may still commit the close
    /// afterwards. Reload the ticket after a timed-out close before offering
    /// another attempt; a retry on a ticket that did close fails with
    /// [`CloseError::AlreadyClosed`].
    ///
    /// # Errors
    ///
    /// - [`CloseError::Validation`]: blank solution, the store is not called
    /// - [`CloseError::AlreadyClosed`]: the ticket is closed or a close is in flight
    /// - [`CloseError::Store`]: `CommitFailed` on rejection or timeout, `NotFound` if missing
    #[tracing::instrument(skip(self, solution), fields(ticket_id = %id))]
    pub async fn close(&self, id: &TicketId, solution: &str) -> Result<(), CloseError> {
        let solution = solution.trim();
        if solution.is_empty() {
            return Err(ValidationError::EmptySolution.into());
        }

        let Some(_in_flight) = InFlight::claim(&self.in_flight, id) else {
            tracing::warn!("Close rejected: another close is in flight");
            return Err(CloseError::AlreadyClosed);
        };

        let update = self.store.update(id.clone(), TicketPatch::close(solution));
        let result = match tokio::time::timeout(self.timeout, update).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(StoreError::PreconditionFailed { .. })) => Err(CloseError::AlreadyClosed),
            Ok(Err(error @ (StoreError::NotFound { .. } | StoreError::CommitFailed(_)))) => {
                Err(CloseError::Store(error))
            },
            Ok(Err(other)) => Err(CloseError::Store(StoreError::CommitFailed(other.to_string()))),
            Err(_) => Err(CloseError::Store(StoreError::CommitFailed(format!(
                "no commit after {:?}",
                self.timeout
            )))),
        };

        match &result {
            Ok(()) => {
                tracing::info!("Ticket closed");
                metrics::counter!("helpdesk.tickets.closed").increment(1);
            },
            Err(error) => {
                tracing::warn!("Ticket close failed: {error}");
                metrics::counter!("helpdesk.tickets.close_failed").increment(1);
            },
        }
        result
    }
}

/// Marks a ticket as having a close in flight until dropped
struct InFlight {
    set: Arc<Mutex<HashSet<TicketId>>>,
    id: TicketId,
}

impl InFlight {
    fn claim(set: &Arc<Mutex<HashSet<TicketId>>>, id: &TicketId) -> Option<Self> {
        let claimed = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        claimed.then(|| Self {
            set: Arc::clone(set),
            id: id.clone(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use helpdesk_core::ticket::NewTicket;
    use helpdesk_testing::{test_clock, InMemoryDocumentStore};

    async fn open_ticket(store: &InMemoryDocumentStore) -> TicketId {
        store
            .create(NewTicket::new("1234", "no power").unwrap())
            .await
            .unwrap()
    }

    fn memory_store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::new(Arc::new(test_clock()))
    }

    #[tokio::test]
    async fn blank_solution_never_reaches_the_store() {
        let store = memory_store();
        let id = open_ticket(&store).await;
        let closer = TicketCloser::new(Arc::new(store.clone()));

        let result = closer.close(&id, "   ").await;

        assert_eq!(result, Err(CloseError::Validation(ValidationError::EmptySolution)));
        assert_eq!(store.update_calls(), 0);
    }

    #[tokio::test]
    async fn solution_is_stored_trimmed() {
        let store = memory_store();
        let id = open_ticket(&store).await;
        let closer = TicketCloser::new(Arc::new(store.clone()));

        closer.close(&id, "  replaced PSU \n").await.unwrap();

        assert_eq!(store.ticket(&id).unwrap().solution(), "replaced PSU");
    }

    #[tokio::test]
    async fn rejected_update_leaves_ticket_open() {
        let store = memory_store();
        let id = open_ticket(&store).await;
        store.fail_next_update(StoreError::CommitFailed("quota".to_string()));
        let closer = TicketCloser::new(Arc::new(store.clone()));

        let result = closer.close(&id, "fixed").await;

        assert!(matches!(result, Err(CloseError::Store(StoreError::CommitFailed(_)))));
        let ticket = store.ticket(&id).unwrap();
        assert!(!ticket.is_closed());
        assert_eq!(ticket.closed_at(), None);
    }

    #[tokio::test]
    async fn timeout_is_a_commit_failure() {
        let store = memory_store();
        let id = open_ticket(&store).await;
        store.set_update_latency(Duration::from_secs(5));
        let closer = TicketCloser::with_timeout(Arc::new(store.clone()), Duration::from_millis(20));

        let result = closer.close(&id, "fixed").await;

        assert!(matches!(result, Err(CloseError::Store(StoreError::CommitFailed(_)))));
        assert!(!store.ticket(&id).unwrap().is_closed());
    }

    #[tokio::test]
    async fn retry_after_late_commit_is_already_closed() {
        let store = memory_store();
        let id = open_ticket(&store).await;
        store.set_update_latency(Duration::from_secs(5));
        let closer = TicketCloser::with_timeout(Arc::new(store.clone()), Duration::from_millis(20));

        let timed_out = closer.close(&id, "fixed").await;
        assert!(matches!(timed_out, Err(CloseError::Store(StoreError::CommitFailed(_)))));

        // The commit lands after the caller stopped waiting.
        store.set_update_latency(Duration::ZERO);
        store.update(id.clone(), TicketPatch::close("fixed")).await.unwrap();

        assert_eq!(closer.close(&id, "fixed").await, Err(CloseError::AlreadyClosed));
        let ticket = store.ticket(&id).unwrap();
        assert!(ticket.is_closed());
        assert_eq!(ticket.solution(), "fixed");
    }

    #[tokio::test]
    async fn concurrent_close_fails_fast() {
        let store = memory_store();
        let id = open_ticket(&store).await;
        store.set_update_latency(Duration::from_millis(100));
        let closer = TicketCloser::new(Arc::new(store.clone()));

        let (first, second) = tokio::join!(closer.close(&id, "first"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            closer.close(&id, "second").await
        });

        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(CloseError::AlreadyClosed));
        assert_eq!(store.ticket(&id).unwrap().solution(), "first");
        assert_eq!(store.update_calls(), 1);
    }
}
