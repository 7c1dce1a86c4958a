//! Error taxonomy for the helpdesk core.
//!
//! Three families, each matching one boundary of the system:
//!
//! - [`AuthError`]: the authentication provider rejected a call
//! - [`ValidationError`]: user input was rejected before any remote call
//! - [`StoreError`]: the document store failed or rejected an operation

use crate::ticket::TicketId;
use thiserror::Error;

/// Errors reported by the authentication provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Sign-in Errors
    // ═══════════════════════════════════════════════════════════

    /// The email address is malformed.
    #[error("Invalid email address")]
    InvalidEmail,

    /// The password does not match the account.
    #[error("Wrong password")]
    WrongPassword,

    /// No account exists for the email address.
    #[error("User not found")]
    UserNotFound,

    // ═══════════════════════════════════════════════════════════
    // Sign-out Errors
    // ═══════════════════════════════════════════════════════════

    /// The provider failed to end the session.
    #[error("Sign out failed: {0}")]
    SignOutFailed(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Any other provider failure (network, quota, ...).
    #[error("Authentication provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Returns `true` if the error was caused by the credentials the user typed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use helpdesk_core::error::AuthError;
    /// assert!(AuthError::WrongPassword.is_credential_error());
    /// assert!(!AuthError::Provider("offline".into()).is_credential_error());
    /// ```
    #[must_use]
    pub const fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail | Self::WrongPassword | Self::UserNotFound
        )
    }
}

/// Input rejected before touching any collaborator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A ticket cannot be closed without a solution.
    #[error("A solution is required to close the ticket")]
    EmptySolution,

    /// Email and password are both required to sign in.
    #[error("Email and password are required")]
    MissingCredentials,

    /// A new ticket needs the equipment asset tag.
    #[error("Patrimony is required")]
    MissingPatrimony,

    /// A new ticket needs a problem description.
    #[error("Description is required")]
    MissingDescription,
}

/// Errors reported by the document store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The document does not exist.
    #[error("Ticket {id} not found")]
    NotFound {
        /// Requested ticket
        id: TicketId,
    },

    /// The store rejected or timed out a write.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// A live query could not be established or was revoked.
    #[error("Subscription failed: {0}")]
    SubscriptionFailed(String),

    /// The update's precondition did not hold; nothing was written.
    #[error("Precondition failed for ticket {id}")]
    PreconditionFailed {
        /// Ticket whose precondition failed
        id: TicketId,
    },

    /// A stored document violates the ticket invariants.
    #[error("Malformed ticket {id}: {reason}")]
    MalformedDocument {
        /// Offending ticket
        id: TicketId,
        /// What is wrong with it
        reason: String,
    },
}

impl StoreError {
    /// Returns `true` if the error means the document does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_are_classified() {
        assert!(AuthError::InvalidEmail.is_credential_error());
        assert!(AuthError::UserNotFound.is_credential_error());
        assert!(!AuthError::SignOutFailed("boom".into()).is_credential_error());
    }

    #[test]
    fn store_error_messages_name_the_ticket() {
        let error = StoreError::NotFound {
            id: TicketId::new("t1"),
        };
        assert_eq!(error.to_string(), "Ticket t1 not found");
        assert!(error.is_not_found());
    }
}
