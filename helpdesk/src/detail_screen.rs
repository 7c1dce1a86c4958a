//! Ticket detail screen.
//!
//! Composes the [`TicketDetailLoader`] and the [`TicketCloser`] for one
//! ticket:
//!
//! ```text
//! Loading ──► Loaded ──submit──► Closing ──ok──► Closed
//!    │          ▲                   │
//!    ▼          └──────error────────┘
//!  Failed
//! ```
//!
//! `Closed` signals that the caller can navigate back. Submits that cannot
//! succeed (blank solution, ticket already closed, close in progress) are
//! rejected in the reducer without touching the store.

use crate::closer::TicketCloser;
use crate::detail::TicketDetailLoader;
use crate::error::CloseError;
use crate::notification::Notification;
use helpdesk_core::effect::Effect;
use helpdesk_core::error::{StoreError, ValidationError};
use helpdesk_core::reducer::Reducer;
use helpdesk_core::ticket::{TicketDetail, TicketId};
use helpdesk_runtime::{RuntimeError, Store, StoreConfig};
use smallvec::{smallvec, SmallVec};
use std::sync::Arc;

/// Where the detail screen is in its lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailPhase {
    /// Fetching the ticket
    Loading,
    /// Ticket shown
    Loaded,
    /// Close submitted, waiting for the store
    Closing,
    /// Closed from this screen
    Closed,
    /// The ticket could not be loaded
    Failed(StoreError),
}

/// State of the detail screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketDetailState {
    /// Ticket shown
    pub id: TicketId,
    /// Lifecycle phase
    pub phase: DetailPhase,
    /// Loaded record
    pub detail: Option<TicketDetail>,
    /// Last message for the user
    pub notification: Option<Notification>,
    /// Why the last close attempt failed
    pub close_error: Option<CloseError>,
}

impl TicketDetailState {
    /// Initial state for `id`
    #[must_use]
    pub const fn new(id: TicketId) -> Self {
        Self {
            id,
            phase: DetailPhase::Loading,
            detail: None,
            notification: None,
            close_error: None,
        }
    }

    fn reject(&mut self, error: CloseError) {
        tracing::debug!("Close rejected: {error}");
        self.notification = Some(Notification::close_failed(&error));
        self.close_error = Some(error);
    }
}

/// Detail screen actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketDetailAction {
    /// Fetch (or re-fetch) the ticket
    Load,
    /// The fetch finished
    Loaded(Result<TicketDetail, StoreError>),
    /// The user submitted a solution
    SubmitClose {
        /// Solution text as typed
        solution: String,
    },
    /// The close finished
    CloseFinished(Result<(), CloseError>),
}

/// Dependencies of the detail screen
#[derive(Clone)]
pub struct TicketDetailEnvironment {
    /// Reads the ticket
    pub loader: TicketDetailLoader,
    /// Closes the ticket
    pub closer: Arc<TicketCloser>,
}

/// Reducer for the detail screen
#[derive(Clone, Copy, Debug, Default)]
pub struct TicketDetailReducer;

impl Reducer for TicketDetailReducer {
    type State = TicketDetailState;
    type Action = TicketDetailAction;
    type Environment = TicketDetailEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TicketDetailAction::Load => {
                if state.phase == DetailPhase::Closing {
                    return SmallVec::new();
                }
                state.phase = DetailPhase::Loading;

                let loader = env.loader.clone();
                let id = state.id.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(TicketDetailAction::Loaded(loader.load(&id).await))
                }))]
            },
            TicketDetailAction::Loaded(Ok(detail)) => {
                state.detail = Some(detail);
                state.phase = DetailPhase::Loaded;
                SmallVec::new()
            },
            TicketDetailAction::Loaded(Err(error)) => {
                state.notification = Some(Notification::load_failed(&error));
                state.detail = None;
                state.phase = DetailPhase::Failed(error);
                SmallVec::new()
            },
            TicketDetailAction::SubmitClose { solution } => {
                let already_closed = matches!(state.phase, DetailPhase::Closing | DetailPhase::Closed)
                    || state.detail.as_ref().is_some_and(TicketDetail::is_closed);
                if already_closed {
                    state.reject(CloseError::AlreadyClosed);
                    return SmallVec::new();
                }
                if state.phase != DetailPhase::Loaded {
                    tracing::debug!("Close submitted before the ticket was loaded");
                    return SmallVec::new();
                }

                if solution.trim().is_empty() {
                    state.reject(ValidationError::EmptySolution.into());
                    return SmallVec::new();
                }

                state.phase = DetailPhase::Closing;
                state.close_error = None;

                let closer = Arc::clone(&env.closer);
                let id = state.id.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(TicketDetailAction::CloseFinished(closer.close(&id, &solution).await))
                }))]
            },
            TicketDetailAction::CloseFinished(Ok(())) => {
                state.phase = DetailPhase::Closed;
                state.notification = Some(Notification::ticket_closed());
                SmallVec::new()
            },
            TicketDetailAction::CloseFinished(Err(error)) => {
                state.phase = DetailPhase::Loaded;
                state.reject(error);
                SmallVec::new()
            },
        }
    }
}

/// Runtime store for a detail screen
pub type TicketDetailStore =
    Store<TicketDetailState, TicketDetailAction, TicketDetailEnvironment, TicketDetailReducer>;

/// A detail screen for one ticket.
pub struct TicketDetailScreen {
    store: TicketDetailStore,
}

impl TicketDetailScreen {
    /// Open the screen for `id` and load the ticket.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ShutdownInProgress`] if the store rejected the load.
    pub async fn open(
        id: TicketId,
        env: TicketDetailEnvironment,
        config: StoreConfig,
    ) -> Result<Self, RuntimeError> {
        let store = Store::with_config(TicketDetailState::new(id), TicketDetailReducer, env, config);
        store.send(TicketDetailAction::Load).await?.wait().await;
        Ok(Self { store })
    }

    /// Re-fetch the ticket
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ShutdownInProgress`] if the store rejected the load.
    pub async fn reload(&self) -> Result<(), RuntimeError> {
        self.store.send(TicketDetailAction::Load).await?.wait().await;
        Ok(())
    }

    /// Submit `solution` and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`CloseError`] recorded by the screen; runtime failures
    /// are reported as a commit failure.
    pub async fn submit_close(&self, solution: &str) -> Result<(), CloseError> {
        let mut handle = self
            .store
            .send(TicketDetailAction::SubmitClose {
                solution: solution.to_string(),
            })
            .await
            .map_err(|error| CloseError::Store(StoreError::CommitFailed(error.to_string())))?;
        handle.wait().await;

        self.store
            .state(|s| match (&s.phase, &s.close_error) {
                (DetailPhase::Closed, None) => Ok(()),
                (_, Some(error)) => Err(error.clone()),
                (phase, None) => Err(CloseError::Store(StoreError::CommitFailed(format!(
                    "close did not complete ({phase:?})"
                )))),
            })
            .await
    }

    /// Current screen state
    pub async fn snapshot(&self) -> TicketDetailState {
        self.store.state(Clone::clone).await
    }

    /// Whether the caller should navigate back
    pub async fn is_done(&self) -> bool {
        self.store.state(|s| s.phase == DetailPhase::Closed).await
    }
}
