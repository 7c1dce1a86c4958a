//! Operation-level errors.
//!
//! Each user-facing operation reports the validation failure or the
//! collaborator failure that stopped it. [`HelpdeskError`] wraps all of them
//! for callers that drive the whole application.

use helpdesk_core::error::{AuthError, StoreError, ValidationError};
use helpdesk_core::format::InvalidFormat;
use helpdesk_runtime::RuntimeError;
use thiserror::Error;

/// Why a sign-in attempt failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignInError {
    /// Email or password was blank; the provider was not called.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider rejected the credentials or failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Why a close attempt failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CloseError {
    /// The solution was blank; the store was not called.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The ticket is closed, or another close of it is in flight.
    #[error("Ticket is already closed")]
    AlreadyClosed,

    /// The store rejected the update, timed out, or lost the ticket.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why registering a new ticket failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// A required field was blank; the store was not called.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Any failure surfaced by the helpdesk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HelpdeskError {
    /// Sign-in failed
    #[error("Sign in failed: {0}")]
    SignIn(#[from] SignInError),

    /// Sign-out failed
    #[error("Sign out failed: {0}")]
    SignOut(#[from] AuthError),

    /// Closing a ticket failed
    #[error("Close failed: {0}")]
    Close(#[from] CloseError),

    /// Registering a ticket failed
    #[error("Register failed: {0}")]
    Register(#[from] RegisterError),

    /// Reading from the store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The screen runtime rejected an action
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// The configured timestamp format is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] InvalidFormat),
}
