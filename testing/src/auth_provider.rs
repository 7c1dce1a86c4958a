//! In-memory authentication provider.
//!
//! Accounts live in a map keyed by email. The current session is held in a
//! `watch` channel, so every [`AuthProvider::session_changes`] stream sees
//! the latest state first and then each change.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use helpdesk_core::auth::{AuthProvider, SessionStream};
use helpdesk_core::error::AuthError;
use helpdesk_core::session::{Session, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Clone, Debug)]
struct Account {
    password: String,
    user_id: UserId,
}

/// In-memory authentication provider with fault injection.
///
/// Cloning shares accounts and session state.
///
/// # Example
///
/// ```
/// use helpdesk_testing::InMemoryAuthProvider;
/// use helpdesk_core::auth::AuthProvider;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = InMemoryAuthProvider::new().with_account("tech@example.com", "secret", "u-1");
///
/// let session = auth.sign_in("tech@example.com", "secret").await?;
/// assert_eq!(session.user_id.as_str(), "u-1");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryAuthProvider {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    session: Arc<watch::Sender<Option<Session>>>,
    fail_next_sign_out: Arc<Mutex<Option<String>>>,
    notification_delay: Arc<Mutex<Option<Duration>>>,
    sign_in_calls: Arc<AtomicUsize>,
}

impl InMemoryAuthProvider {
    /// Create a provider with no accounts and nobody signed in
    #[must_use]
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            session: Arc::new(session),
            fail_next_sign_out: Arc::new(Mutex::new(None)),
            notification_delay: Arc::new(Mutex::new(None)),
            sign_in_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register an account
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, user_id: &str) -> Self {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user_id: UserId::new(user_id),
            },
        );
        self
    }

    /// Start with `session` already signed in (a session restored by the provider)
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        self.session.send_replace(Some(session));
        self
    }

    /// Delay the first notification of every new session stream
    #[must_use]
    pub fn with_notification_delay(self, delay: Duration) -> Self {
        *self.notification_delay.lock().unwrap() = Some(delay);
        self
    }

    /// The provider's current session
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Number of `sign_in` calls received
    #[must_use]
    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    /// Make the next `sign_out` fail with `reason`
    pub fn fail_next_sign_out(&self, reason: &str) {
        *self.fail_next_sign_out.lock().unwrap() = Some(reason.to_string());
    }

    /// Invalidate the current session on the provider side
    pub fn expire_session(&self) {
        self.session.send_replace(None);
    }
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

impl AuthProvider for InMemoryAuthProvider {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Session, AuthError>> + Send + '_>> {
        let email = email.trim().to_string();
        let password = password.to_string();

        Box::pin(async move {
            self.sign_in_calls.fetch_add(1, Ordering::SeqCst);

            if !is_valid_email(&email) {
                return Err(AuthError::InvalidEmail);
            }

            let account = self
                .accounts
                .lock()
                .unwrap()
                .get(&email)
                .cloned()
                .ok_or(AuthError::UserNotFound)?;

            if account.password != password {
                return Err(AuthError::WrongPassword);
            }

            let session = Session::new(account.user_id).with_email(email);
            self.session.send_replace(Some(session.clone()));
            Ok(session)
        })
    }

    fn sign_out(&self) -> Pin<Box<dyn Future<Output = Result<(), AuthError>> + Send + '_>> {
        Box::pin(async move {
            if let Some(reason) = self.fail_next_sign_out.lock().unwrap().take() {
                return Err(AuthError::SignOutFailed(reason));
            }
            self.session.send_replace(None);
            Ok(())
        })
    }

    fn session_changes(&self) -> SessionStream {
        let mut receiver = self.session.subscribe();
        receiver.mark_changed();
        let delay = *self.notification_delay.lock().unwrap();

        Box::pin(async_stream::stream! {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            while receiver.changed().await.is_ok() {
                let session = receiver.borrow_and_update().clone();
                yield session;
            }
        })
    }
}
