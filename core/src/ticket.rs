//! Tickets, their lifecycle, and the read-only projections screens render.
//!
//! A ticket is created `open` and transitions exactly once to `closed`,
//! at which point it gains a solution and a close timestamp. The typed
//! [`Ticket`] makes the invariant structural: both values live together in
//! an optional [`Resolution`], and the status is derived from it.
//!
//! [`TicketDocument`] is the persisted layout, holding exactly the fields
//! stored in the remote collection. Converting a document into a [`Ticket`]
//! checks the invariant.

use crate::error::{StoreError, ValidationError};
use crate::format::TimestampFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `TicketId` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid ticket ID: {0}")]
pub struct ParseTicketIdError(String);

/// Opaque identifier of a ticket document, assigned by the store.
///
/// # Validation
///
/// - `FromStr::from_str()`: Validates input (rejects empty strings)
/// - `From::from()` and `new()`: No validation (for ids coming from the store)
///
/// # Examples
///
/// ```
/// use helpdesk_core::ticket::TicketId;
///
/// let id = TicketId::new("t1");
/// assert_eq!(id.as_str(), "t1");
///
/// let parsed: TicketId = "t2".parse().unwrap();
/// assert_eq!(parsed, TicketId::new("t2"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketId(String);

impl TicketId {
    /// Create a new `TicketId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ticket ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the `TicketId` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = ParseTicketIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseTicketIdError("Ticket ID cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TicketId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TicketId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TicketId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status of a ticket. Also used as the list filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Waiting for a technician
    #[default]
    Open,
    /// Resolved; terminal
    Closed,
}

impl TicketStatus {
    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solution text and close time of a closed ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    solution: String,
    closed_at: DateTime<Utc>,
}

impl Resolution {
    /// Create a resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySolution`] if `solution` is blank.
    pub fn new(solution: impl Into<String>, closed_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let solution = solution.into();
        if solution.trim().is_empty() {
            return Err(ValidationError::EmptySolution);
        }
        Ok(Self {
            solution,
            closed_at,
        })
    }

    /// The solution text
    #[must_use]
    pub fn solution(&self) -> &str {
        &self.solution
    }

    /// When the ticket was closed
    #[must_use]
    pub const fn closed_at(&self) -> DateTime<Utc> {
        self.closed_at
    }
}

/// A ticket as seen by the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    /// Document identifier
    pub id: TicketId,
    /// Equipment asset tag
    pub patrimony: String,
    /// Problem description
    pub description: String,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
    resolution: Option<Resolution>,
}

impl Ticket {
    /// Create an open ticket.
    #[must_use]
    pub fn open(
        id: TicketId,
        patrimony: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            patrimony: patrimony.into(),
            description: description.into(),
            created_at,
            resolution: None,
        }
    }

    /// Close this ticket with `resolution`, consuming the open ticket.
    #[must_use]
    pub fn closed(self, resolution: Resolution) -> Self {
        Self {
            resolution: Some(resolution),
            ..self
        }
    }

    /// Current status, derived from the resolution
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        if self.resolution.is_some() {
            TicketStatus::Closed
        } else {
            TicketStatus::Open
        }
    }

    /// Returns `true` once the ticket is closed
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.resolution.is_some()
    }

    /// The resolution, present only when closed
    #[must_use]
    pub const fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Solution text; empty while open
    #[must_use]
    pub fn solution(&self) -> &str {
        self.resolution.as_ref().map_or("", Resolution::solution)
    }

    /// Close time; absent while open
    #[must_use]
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.resolution.as_ref().map(Resolution::closed_at)
    }

    /// Decode a stored document, checking the lifecycle invariant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedDocument`] when `status`, `solution`
    /// and `closed_at` disagree.
    pub fn from_document(id: TicketId, document: TicketDocument) -> Result<Self, StoreError> {
        let malformed = |reason: &str| StoreError::MalformedDocument {
            id: id.clone(),
            reason: reason.to_string(),
        };

        let has_solution = !document.solution.trim().is_empty();
        let resolution = match (document.status, document.closed_at) {
            (TicketStatus::Open, None) if !has_solution => None,
            (TicketStatus::Open, None) => return Err(malformed("open ticket has a solution")),
            (TicketStatus::Open, Some(_)) => return Err(malformed("open ticket has closed_at")),
            (TicketStatus::Closed, None) => return Err(malformed("closed ticket lacks closed_at")),
            (TicketStatus::Closed, Some(closed_at)) => Some(
                Resolution::new(document.solution, closed_at)
                    .map_err(|_| malformed("closed ticket lacks a solution"))?,
            ),
        };

        Ok(Self {
            id,
            patrimony: document.patrimony,
            description: document.description,
            created_at: document.created_at,
            resolution,
        })
    }

    /// Encode into the persisted layout
    #[must_use]
    pub fn to_document(&self) -> TicketDocument {
        TicketDocument {
            patrimony: self.patrimony.clone(),
            description: self.description.clone(),
            status: self.status(),
            solution: self.solution().to_string(),
            created_at: self.created_at,
            closed_at: self.closed_at(),
        }
    }

    /// Project into the list view
    #[must_use]
    pub fn to_list_item(&self, format: &TimestampFormat) -> TicketListItem {
        TicketListItem {
            id: self.id.clone(),
            patrimony: self.patrimony.clone(),
            description: self.description.clone(),
            status: self.status(),
            when: format.format(self.created_at),
        }
    }

    /// Project into the detail view
    #[must_use]
    pub fn to_detail(&self, format: &TimestampFormat) -> TicketDetail {
        TicketDetail {
            id: self.id.clone(),
            patrimony: self.patrimony.clone(),
            description: self.description.clone(),
            status: self.status(),
            when: format.format(self.created_at),
            solution: self.solution().to_string(),
            closed: self.closed_at().map(|closed_at| format.format(closed_at)),
        }
    }
}

/// Persisted layout of a ticket document in the remote collection.
///
/// Holds exactly the stored fields; the document id lives outside the
/// document. Unknown fields are ignored when decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDocument {
    /// Equipment asset tag
    pub patrimony: String,
    /// Problem description
    pub description: String,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Solution text, empty while open
    #[serde(default)]
    pub solution: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Close time, absent while open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

/// Validated input for a new ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTicket {
    patrimony: String,
    description: String,
}

impl NewTicket {
    /// Validate a new ticket.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingPatrimony`] or
    /// [`ValidationError::MissingDescription`] for blank fields.
    pub fn new(patrimony: impl Into<String>, description: impl Into<String>) -> Result<Self, ValidationError> {
        let patrimony = patrimony.into();
        let description = description.into();
        if patrimony.trim().is_empty() {
            return Err(ValidationError::MissingPatrimony);
        }
        if description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        Ok(Self {
            patrimony,
            description,
        })
    }

    /// Equipment asset tag
    #[must_use]
    pub fn patrimony(&self) -> &str {
        &self.patrimony
    }

    /// Problem description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The document to store, stamped with the server's creation time
    #[must_use]
    pub fn into_document(self, created_at: DateTime<Utc>) -> TicketDocument {
        TicketDocument {
            patrimony: self.patrimony,
            description: self.description,
            status: TicketStatus::Open,
            solution: String::new(),
            created_at,
            closed_at: None,
        }
    }
}

/// Row of the ticket list screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TicketListItem {
    /// Ticket id
    pub id: TicketId,
    /// Equipment asset tag
    pub patrimony: String,
    /// Problem description
    pub description: String,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Formatted creation time
    pub when: String,
}

/// Full record shown on the detail screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TicketDetail {
    /// Ticket id
    pub id: TicketId,
    /// Equipment asset tag
    pub patrimony: String,
    /// Problem description
    pub description: String,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Formatted creation time
    pub when: String,
    /// Solution text, empty while open
    pub solution: String,
    /// Formatted close time, absent while open
    pub closed: Option<String>,
}

impl TicketDetail {
    /// Returns `true` once the ticket is closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }
}
