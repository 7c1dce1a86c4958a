//! # Helpdesk Testing
//!
//! Testing utilities for the helpdesk workspace.
//!
//! This crate provides:
//! - A fixed [`Clock`] for deterministic timestamps
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - [`InMemoryDocumentStore`] and [`InMemoryAuthProvider`], in-memory
//!   collaborators with fault injection
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_testing::{test_clock, InMemoryDocumentStore};
//!
//! #[tokio::test]
//! async fn closes_ticket() {
//!     let store = Arc::new(InMemoryDocumentStore::new(Arc::new(test_clock())));
//!     let id = store.create(NewTicket::new("1234", "no power")?).await?;
//!
//!     TicketCloser::new(store.clone()).close(&id, "replaced PSU").await?;
//!     assert!(store.ticket(&id).unwrap().is_closed());
//! }
//! ```

use chrono::{DateTime, Utc};
use helpdesk_core::environment::Clock;

pub mod auth_provider;
pub mod document_store;
pub mod reducer_test;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use helpdesk_testing::mocks::FixedClock;
    /// use helpdesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber.
    ///
    /// Honors `RUST_LOG` and writes through the test harness so output is
    /// captured per test. Safe to call from every test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use auth_provider::InMemoryAuthProvider;
pub use document_store::InMemoryDocumentStore;
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};
