//! Application wiring.
//!
//! Builds every component from a [`Config`] and the two collaborators.

use crate::closer::TicketCloser;
use crate::config::Config;
use crate::detail::TicketDetailLoader;
use crate::detail_screen::{TicketDetailEnvironment, TicketDetailScreen};
use crate::error::HelpdeskError;
use crate::list::{TicketListEnvironment, TicketListScreen};
use crate::registrar::TicketRegistrar;
use crate::routing::RoutingGate;
use crate::session::SessionManager;
use helpdesk_core::auth::AuthProvider;
use helpdesk_core::document_store::DocumentStore;
use helpdesk_core::format::TimestampFormat;
use helpdesk_core::ticket::TicketId;
use std::sync::Arc;

/// The assembled helpdesk.
pub struct Helpdesk {
    config: Config,
    format: TimestampFormat,
    store: Arc<dyn DocumentStore>,
    session: SessionManager,
    loader: TicketDetailLoader,
    closer: Arc<TicketCloser>,
    registrar: TicketRegistrar,
}

impl Helpdesk {
    /// Wire the helpdesk. Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::Config`] if the timestamp format is invalid.
    pub fn start(
        config: Config,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, HelpdeskError> {
        let format = config.timestamp_format()?;

        if store.collection() != config.collection {
            tracing::warn!(
                configured = %config.collection,
                actual = %store.collection(),
                "Document store is bound to a different collection"
            );
        }
        tracing::info!(collection = %store.collection(), "Helpdesk started");

        Ok(Self {
            session: SessionManager::start(auth),
            loader: TicketDetailLoader::new(Arc::clone(&store), format.clone()),
            closer: Arc::new(TicketCloser::with_timeout(Arc::clone(&store), config.close_timeout())),
            registrar: TicketRegistrar::new(Arc::clone(&store)),
            store,
            format,
            config,
        })
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Session Manager
    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    /// A routing gate following the session
    #[must_use]
    pub fn routing_gate(&self) -> RoutingGate {
        RoutingGate::spawn(self.session.subscribe(), self.config.store_config())
    }

    /// A new (inactive) ticket list screen
    #[must_use]
    pub fn ticket_list(&self) -> TicketListScreen {
        TicketListScreen::new(
            TicketListEnvironment {
                store: Arc::clone(&self.store),
                format: self.format.clone(),
            },
            self.config.store_config(),
        )
    }

    /// Open the detail screen of `id`
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::Runtime`] if the screen could not start.
    pub async fn ticket_detail(&self, id: TicketId) -> Result<TicketDetailScreen, HelpdeskError> {
        let env = TicketDetailEnvironment {
            loader: self.loader.clone(),
            closer: Arc::clone(&self.closer),
        };
        Ok(TicketDetailScreen::open(id, env, self.config.store_config()).await?)
    }

    /// Ticket Detail Loader
    #[must_use]
    pub const fn loader(&self) -> &TicketDetailLoader {
        &self.loader
    }

    /// Ticket Closer
    #[must_use]
    pub fn closer(&self) -> &TicketCloser {
        &self.closer
    }

    /// Ticket Registrar
    #[must_use]
    pub const fn registrar(&self) -> &TicketRegistrar {
        &self.registrar
    }
}
