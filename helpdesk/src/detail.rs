//! Ticket Detail Loader.

use helpdesk_core::document_store::DocumentStore;
use helpdesk_core::error::StoreError;
use helpdesk_core::format::TimestampFormat;
use helpdesk_core::ticket::{TicketDetail, TicketId};
use std::sync::Arc;

/// One-shot reader of a ticket's full record.
///
/// Not a subscription: the detail may go stale and is refreshed only by
/// calling [`TicketDetailLoader::load`] again.
#[derive(Clone)]
pub struct TicketDetailLoader {
    store: Arc<dyn DocumentStore>,
    format: TimestampFormat,
}

impl TicketDetailLoader {
    /// Create a loader formatting timestamps with `format`
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, format: TimestampFormat) -> Self {
        Self { store, format }
    }

    /// Fetch one ticket and project it for the detail screen.
    ///
    /// Performs exactly one store read.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`]: the ticket does not exist
    /// - [`StoreError::MalformedDocument`]: the stored ticket is inconsistent
    #[tracing::instrument(skip(self), fields(ticket_id = %id))]
    pub async fn load(&self, id: &TicketId) -> Result<TicketDetail, StoreError> {
        match self.store.get(id.clone()).await {
            Ok(ticket) => Ok(ticket.to_detail(&self.format)),
            Err(error) => {
                tracing::warn!("Ticket load failed: {error}");
                Err(error)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use helpdesk_core::environment::Clock;
    use helpdesk_core::ticket::{Resolution, Ticket, TicketStatus};
    use helpdesk_testing::{test_clock, InMemoryDocumentStore};

    #[tokio::test]
    async fn load_formats_both_timestamps() {
        let store = InMemoryDocumentStore::new(Arc::new(test_clock()));
        let created = test_clock().now();
        let closed = created + chrono::Duration::hours(2);
        store.insert(
            &Ticket::open(TicketId::new("t9"), "77", "broken screen", created)
                .closed(Resolution::new("replaced panel", closed).unwrap()),
        );
        let loader = TicketDetailLoader::new(Arc::new(store), TimestampFormat::default());

        let detail = loader.load(&TicketId::new("t9")).await.unwrap();

        assert_eq!(detail.status, TicketStatus::Closed);
        assert_eq!(detail.when, "01/01/2025 00:00");
        assert_eq!(detail.closed.as_deref(), Some("01/01/2025 02:00"));
    }

    #[tokio::test]
    async fn missing_ticket_is_not_found() {
        let store = InMemoryDocumentStore::new(Arc::new(test_clock()));
        let loader = TicketDetailLoader::new(Arc::new(store), TimestampFormat::default());

        let result = loader.load(&TicketId::new("gone")).await;

        assert_eq!(result, Err(StoreError::NotFound { id: TicketId::new("gone") }));
    }
}
