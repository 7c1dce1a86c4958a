//! User-facing notifications.
//!
//! Remote failures never propagate to the screens as errors to crash on;
//! they are logged and turned into a short notification the screen shows.
//! Re-attempting the action is the recovery path.

use crate::error::{CloseError, RegisterError, SignInError};
use helpdesk_core::error::{AuthError, StoreError, ValidationError};
use serde::Serialize;
use std::fmt;

/// Where a notification is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationContext {
    /// Sign-in screen
    SignIn,
    /// Sign-out action
    SignOut,
    /// Ticket screens (list, detail, new ticket)
    Ticket,
}

impl NotificationContext {
    /// Title shown with the message
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in",
            Self::SignOut => "Sign out",
            Self::Ticket => "Request",
        }
    }
}

/// A message for the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Where it is shown
    pub context: NotificationContext,
    /// What it says
    pub message: String,
}

impl Notification {
    /// Create a notification
    #[must_use]
    pub fn new(context: NotificationContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    /// A failed sign-in
    #[must_use]
    pub fn sign_in_failed(error: &SignInError) -> Self {
        let message = match error {
            SignInError::Validation(_) => "Enter your email and password",
            SignInError::Auth(AuthError::InvalidEmail) => "Invalid email",
            SignInError::Auth(AuthError::WrongPassword) => "Email or password is invalid",
            SignInError::Auth(AuthError::UserNotFound) => "User not registered",
            SignInError::Auth(_) => "Could not sign in",
        };
        Self::new(NotificationContext::SignIn, message)
    }

    /// A failed sign-out
    #[must_use]
    pub fn sign_out_failed(_error: &AuthError) -> Self {
        Self::new(NotificationContext::SignOut, "Could not sign out")
    }

    /// A successful close
    #[must_use]
    pub fn ticket_closed() -> Self {
        Self::new(NotificationContext::Ticket, "Request closed")
    }

    /// A failed close
    #[must_use]
    pub fn close_failed(error: &CloseError) -> Self {
        let message = match error {
            CloseError::Validation(_) => "Enter the solution to close the request",
            CloseError::AlreadyClosed => "This request is already closed",
            CloseError::Store(StoreError::NotFound { .. }) => "This request no longer exists",
            CloseError::Store(_) => "Could not close the request",
        };
        Self::new(NotificationContext::Ticket, message)
    }

    /// A successful registration
    #[must_use]
    pub fn ticket_registered() -> Self {
        Self::new(NotificationContext::Ticket, "Request registered")
    }

    /// A failed registration
    #[must_use]
    pub fn register_failed(error: &RegisterError) -> Self {
        let message = match error {
            RegisterError::Validation(ValidationError::MissingPatrimony) => "Enter the equipment patrimony",
            RegisterError::Validation(_) => "Fill in all fields",
            RegisterError::Store(_) => "Could not register the request",
        };
        Self::new(NotificationContext::Ticket, message)
    }

    /// A failed detail load
    #[must_use]
    pub fn load_failed(error: &StoreError) -> Self {
        let message = if error.is_not_found() {
            "This request no longer exists"
        } else {
            "Could not load the request"
        };
        Self::new(NotificationContext::Ticket, message)
    }

    /// A live list that stopped updating
    #[must_use]
    pub fn subscription_lost(_error: &StoreError) -> Self {
        Self::new(NotificationContext::Ticket, "Requests are no longer being updated")
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context.title(), self.message)
    }
}
