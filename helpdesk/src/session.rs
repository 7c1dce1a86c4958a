//! Session Manager.
//!
//! Owns the authentication state of the application. The provider is the
//! source of truth; the manager forwards sign-in and sign-out calls and
//! republishes the provider's session notifications to any number of
//! subscribers. It is the only writer of the session state.
//!
//! ```text
//! AuthProvider ──session_changes──► listener task ──┐
//!                                                   ▼
//! sign_in / sign_out ─────────────────────► watch<SessionState> ──► subscribers
//! ```

use crate::error::SignInError;
use futures::StreamExt;
use helpdesk_core::auth::AuthProvider;
use helpdesk_core::error::{AuthError, ValidationError};
use helpdesk_core::session::Session;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Authentication state as known to the manager.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// The provider has not reported its initial state yet
    #[default]
    Pending,
    /// Latest reported session (`None` when signed out)
    Resolved(Option<Session>),
}

/// Session Manager.
///
/// Must be started inside a Tokio runtime. Dropping the manager stops the
/// listener and ends every subscription.
pub struct SessionManager {
    provider: Arc<dyn AuthProvider>,
    state: Arc<watch::Sender<SessionState>>,
    listener: JoinHandle<()>,
}

impl SessionManager {
    /// Start observing `provider`.
    #[must_use]
    pub fn start(provider: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Pending);
        let state = Arc::new(state);

        let mut changes = provider.session_changes();
        let listener_state = Arc::clone(&state);
        let listener = tokio::spawn(async move {
            while let Some(session) = changes.next().await {
                tracing::debug!(signed_in = session.is_some(), "Provider reported session change");
                publish(&listener_state, SessionState::Resolved(session));
            }
            tracing::debug!("Provider session stream ended");
        });

        Self {
            provider,
            state,
            listener,
        }
    }

    /// Subscribe to session changes.
    ///
    /// The first [`SessionSubscription::next`] yields the current session as
    /// soon as the provider has reported its initial state.
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        let mut receiver = self.state.subscribe();
        receiver.mark_changed();
        SessionSubscription { receiver }
    }

    /// The latest resolved session; `None` while signed out or still pending.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        match &*self.state.borrow() {
            SessionState::Resolved(session) => session.clone(),
            SessionState::Pending => None,
        }
    }

    /// The full state, including whether the provider has reported yet
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Sign in with email and password.
    ///
    /// The session state is left unchanged on failure.
    ///
    /// # Errors
    ///
    /// - [`SignInError::Validation`]: email or password blank, the provider is not called
    /// - [`SignInError::Auth`]: the provider rejected the credentials
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, SignInError> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(ValidationError::MissingCredentials.into());
        }

        let session = self.provider.sign_in(email, password).await.map_err(|error| {
            tracing::warn!("Sign in failed: {error}");
            error
        })?;

        tracing::info!(user_id = %session.user_id, "Signed in");
        publish(&self.state, SessionState::Resolved(Some(session.clone())));
        Ok(session)
    }

    /// End the current session.
    ///
    /// On success the absent session is published before returning, so the
    /// next notification every subscriber sees is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignOutFailed`] if the provider call fails.
    #[tracing::instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await.map_err(|error| {
            tracing::warn!("Sign out failed: {error}");
            match error {
                AuthError::SignOutFailed(_) => error,
                other => AuthError::SignOutFailed(other.to_string()),
            }
        })?;

        tracing::info!("Signed out");
        publish(&self.state, SessionState::Resolved(None));
        Ok(())
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Replace the state, notifying subscribers only on an actual change
fn publish(state: &watch::Sender<SessionState>, next: SessionState) {
    state.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

/// Receiver side of [`SessionManager::subscribe`].
#[derive(Clone, Debug)]
pub struct SessionSubscription {
    receiver: watch::Receiver<SessionState>,
}

impl SessionSubscription {
    /// Wait for the next session change.
    ///
    /// Returns `None` once the manager is gone.
    pub async fn next(&mut self) -> Option<Option<Session>> {
        loop {
            self.receiver.changed().await.ok()?;
            if let SessionState::Resolved(session) = &*self.receiver.borrow_and_update() {
                return Some(session.clone());
            }
        }
    }
}
