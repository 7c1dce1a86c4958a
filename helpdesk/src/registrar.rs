//! Ticket Registrar.

use crate::error::RegisterError;
use helpdesk_core::document_store::DocumentStore;
use helpdesk_core::error::StoreError;
use helpdesk_core::ticket::{NewTicket, TicketId};
use std::sync::Arc;

/// Validates and creates new open tickets.
#[derive(Clone)]
pub struct TicketRegistrar {
    store: Arc<dyn DocumentStore>,
}

impl TicketRegistrar {
    /// Create a registrar writing to `store`
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Register a ticket for the equipment `patrimony`.
    ///
    /// The ticket starts open with an empty solution and a server-assigned
    /// creation time.
    ///
    /// # Errors
    ///
    /// - [`RegisterError::Validation`]: a field is blank, the store is not called
    /// - [`RegisterError::Store`]: the store rejected the write (`CommitFailed`)
    #[tracing::instrument(skip(self, description))]
    pub async fn register(&self, patrimony: &str, description: &str) -> Result<TicketId, RegisterError> {
        let ticket = NewTicket::new(patrimony.trim(), description.trim())?;

        let id = self.store.create(ticket).await.map_err(|error| {
            tracing::warn!("Ticket registration failed: {error}");
            match error {
                StoreError::CommitFailed(_) => error,
                other => StoreError::CommitFailed(other.to_string()),
            }
        })?;

        tracing::info!(ticket_id = %id, "Ticket registered");
        metrics::counter!("helpdesk.tickets.registered").increment(1);
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use helpdesk_core::error::ValidationError;
    use helpdesk_core::ticket::TicketStatus;
    use helpdesk_testing::{test_clock, InMemoryDocumentStore};

    #[tokio::test]
    async fn blank_fields_are_rejected_before_the_store() {
        let store = InMemoryDocumentStore::new(Arc::new(test_clock()));
        let registrar = TicketRegistrar::new(Arc::new(store.clone()));

        assert_eq!(
            registrar.register(" ", "no power").await,
            Err(RegisterError::Validation(ValidationError::MissingPatrimony))
        );
        assert_eq!(
            registrar.register("1234", "").await,
            Err(RegisterError::Validation(ValidationError::MissingDescription))
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn registered_ticket_starts_open() {
        let store = InMemoryDocumentStore::new(Arc::new(test_clock()));
        let registrar = TicketRegistrar::new(Arc::new(store.clone()));

        let id = registrar.register("1234", "no power").await.unwrap();

        let document = store.document(&id).unwrap();
        assert_eq!(document.status, TicketStatus::Open);
        assert_eq!(document.solution, "");
        assert_eq!(document.closed_at, None);
        assert_eq!(document.created_at, helpdesk_core::environment::Clock::now(&test_clock()));
    }
}
