//! Authentication provider abstraction.
//!
//! The provider is the source of truth for who is signed in. The core never
//! caches credentials: it forwards sign-in/sign-out calls and observes the
//! provider's session notifications.
//!
//! # Implementations
//!
//! - `InMemoryAuthProvider` (helpdesk-testing) - accounts held in memory, with fault injection
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! provider can be shared as `Arc<dyn AuthProvider>`.

use crate::error::AuthError;
use crate::session::Session;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;

/// Stream of session notifications.
///
/// Yields the current session (or `None`) on every authentication-state
/// change: the initial state, sign-in, sign-out, and provider-side
/// invalidation. The first item reports the initial state.
pub type SessionStream = Pin<Box<dyn Stream<Item = Option<Session>> + Send>>;

/// Authentication provider collaborator.
pub trait AuthProvider: Send + Sync {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidEmail`]: malformed email
    /// - [`AuthError::WrongPassword`]: password mismatch
    /// - [`AuthError::UserNotFound`]: no such account
    /// - [`AuthError::Provider`]: any other provider failure
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Session, AuthError>> + Send + '_>>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignOutFailed`] if the provider call fails.
    fn sign_out(&self) -> Pin<Box<dyn Future<Output = Result<(), AuthError>> + Send + '_>>;

    /// Observe session changes, starting with the current state.
    fn session_changes(&self) -> SessionStream;
}
