//! # Helpdesk
//!
//! Ticket lifecycle and real-time synchronization core of a helpdesk.
//!
//! Authenticated users register equipment service requests (tickets), follow
//! them filtered by status, and close them with a solution. This crate keeps
//! a local view of the tickets consistent with a remote document store,
//! enforces the `open → closed` transition, and gates every screen behind
//! an authentication session.
//!
//! ## Components
//!
//! | Component | Module |
//! |---|---|
//! | Session Manager | [`session`] |
//! | Ticket List Synchronizer | [`list`] |
//! | Ticket Detail Loader | [`detail`] |
//! | Ticket Closer | [`closer`] |
//! | Ticket Registrar | [`registrar`] |
//! | Routing Gate | [`routing`] |
//! | Detail screen | [`detail_screen`] |
//!
//! Screens are pure renderers of the state these components expose. The
//! authentication provider and the document store are injected as
//! `Arc<dyn AuthProvider>` / `Arc<dyn DocumentStore>`.
//!
//! ## Example
//!
//! ```ignore
//! let helpdesk = Helpdesk::start(Config::from_env(), auth, store)?;
//! let gate = helpdesk.routing_gate();
//!
//! helpdesk.session().sign_in("tech@example.com", "secret").await?;
//! gate.wait_for_screen(Screen::App, Duration::from_secs(1)).await?;
//!
//! let list = helpdesk.ticket_list();
//! let subscription = list.activate(TicketStatus::Open).await?;
//! // ... render list.items() on every list.changes() notification ...
//! subscription.release().await?;
//! ```

pub mod app;
pub mod closer;
pub mod config;
pub mod detail;
pub mod detail_screen;
pub mod error;
pub mod list;
pub mod notification;
pub mod registrar;
pub mod routing;
pub mod session;

pub use app::Helpdesk;
pub use config::Config;
pub use error::{CloseError, HelpdeskError, RegisterError, SignInError};
pub use notification::{Notification, NotificationContext};
pub use routing::{Route, Screen};
