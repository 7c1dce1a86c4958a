//! Ticket List Synchronizer.
//!
//! Keeps the list screen in sync with a live query over the ticket
//! collection. The reducer owns the subscription lifecycle:
//!
//! - `Activate` / `SelectFilter` cancel the current live query and start a
//!   new one in the same reducer step, clearing the items so old and new
//!   results are never mixed
//! - every live query is tagged with a generation; anything tagged with a
//!   superseded generation is discarded
//! - `Deactivate` cancels the live query, unless a later `Activate` has
//!   already taken over the screen
//!
//! Snapshots keep the store's native ordering.
//!
//! [`TicketListScreen`] wraps the reducer in a runtime [`Store`] and hands
//! out an [`ActiveSubscription`] guard that releases the live query on every
//! exit path.

use crate::notification::Notification;
use futures::StreamExt;
use helpdesk_core::document_store::DocumentStore;
use helpdesk_core::effect::{Effect, EffectId};
use helpdesk_core::error::StoreError;
use helpdesk_core::format::TimestampFormat;
use helpdesk_core::reducer::Reducer;
use helpdesk_core::ticket::{TicketListItem, TicketStatus};
use helpdesk_runtime::{RuntimeError, Store, StoreConfig};
use smallvec::{smallvec, SmallVec};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Cancellation id of the list's live query
pub const LIST_SUBSCRIPTION: EffectId = EffectId::new("ticket-list-subscription");

/// State of the ticket list screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketListState {
    /// Requested status filter
    pub filter: TicketStatus,
    /// Whether the screen is active (a live query should be running)
    pub active: bool,
    /// Activation that owns the screen; older deactivations are ignored
    pub activation: u64,
    /// Generation of the current live query
    pub generation: u64,
    /// Waiting for the first snapshot of the current live query
    pub loading: bool,
    /// Latest snapshot, in the store's order
    pub items: Vec<TicketListItem>,
    /// Why the current live query stopped, if it failed
    pub error: Option<StoreError>,
}

impl TicketListState {
    /// Notification to show when live updates stopped
    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        self.error.as_ref().map(Notification::subscription_lost)
    }
}

/// Actions for the ticket list screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketListAction {
    /// The screen became active
    Activate {
        /// Initial status filter
        filter: TicketStatus,
        /// Activation number handed to the guard
        activation: u64,
    },
    /// The user switched the status filter
    SelectFilter {
        /// New status filter
        filter: TicketStatus,
    },
    /// The screen became inactive
    Deactivate {
        /// Activation being released
        activation: u64,
    },
    /// A live query delivered its current result set
    SnapshotReceived {
        /// Live query generation
        generation: u64,
        /// Result set, projected for the list
        items: Vec<TicketListItem>,
    },
    /// A live query could not be established or was revoked
    SubscriptionFailed {
        /// Live query generation
        generation: u64,
        /// What went wrong
        error: StoreError,
    },
}

/// Dependencies of the ticket list reducer
#[derive(Clone)]
pub struct TicketListEnvironment {
    /// Ticket store
    pub store: Arc<dyn DocumentStore>,
    /// Formatting rule for `when`
    pub format: TimestampFormat,
}

/// Reducer for the ticket list screen
#[derive(Clone, Copy, Debug, Default)]
pub struct TicketListReducer;

impl TicketListReducer {
    /// Cancel the current live query and start one for `state.filter`
    fn resubscribe(
        state: &mut TicketListState,
        env: &TicketListEnvironment,
    ) -> SmallVec<[Effect<TicketListAction>; 4]> {
        state.generation += 1;
        state.loading = true;
        state.items.clear();
        state.error = None;

        let generation = state.generation;
        let filter = state.filter;
        let store = Arc::clone(&env.store);
        let format = env.format.clone();

        tracing::debug!(%filter, generation, "Starting live ticket query");

        let snapshots = async_stream::stream! {
            match store.query(filter).await {
                Ok(mut snapshots) => {
                    while let Some(snapshot) = snapshots.next().await {
                        match snapshot {
                            Ok(tickets) => yield TicketListAction::SnapshotReceived {
                                generation,
                                items: tickets.iter().map(|ticket| ticket.to_list_item(&format)).collect(),
                            },
                            Err(error) => {
                                yield TicketListAction::SubscriptionFailed { generation, error };
                                break;
                            },
                        }
                    }
                },
                Err(error) => yield TicketListAction::SubscriptionFailed { generation, error },
            }
        };

        smallvec![
            Effect::Cancel(LIST_SUBSCRIPTION),
            Effect::Stream(Box::pin(snapshots)).cancellable(LIST_SUBSCRIPTION),
        ]
    }

    fn is_current(state: &TicketListState, generation: u64) -> bool {
        if state.active && generation == state.generation {
            true
        } else {
            tracing::debug!(
                generation,
                current = state.generation,
                "Discarding result from superseded live query"
            );
            false
        }
    }
}

impl Reducer for TicketListReducer {
    type State = TicketListState;
    type Action = TicketListAction;
    type Environment = TicketListEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TicketListAction::Activate { filter, activation } => {
                if activation < state.activation {
                    tracing::debug!(
                        activation,
                        current = state.activation,
                        "Ignoring superseded activation"
                    );
                    return SmallVec::new();
                }
                state.activation = activation;
                state.active = true;
                state.filter = filter;
                Self::resubscribe(state, env)
            },
            TicketListAction::SelectFilter { filter } => {
                if state.active && state.filter == filter {
                    return SmallVec::new();
                }
                state.filter = filter;
                if state.active {
                    Self::resubscribe(state, env)
                } else {
                    SmallVec::new()
                }
            },
            TicketListAction::Deactivate { activation } => {
                if !state.active || activation != state.activation {
                    tracing::debug!(
                        activation,
                        current = state.activation,
                        "Ignoring stale deactivation"
                    );
                    return SmallVec::new();
                }
                state.active = false;
                state.loading = false;
                state.generation += 1;
                tracing::debug!("Releasing live ticket query");
                smallvec![Effect::Cancel(LIST_SUBSCRIPTION)]
            },
            TicketListAction::SnapshotReceived { generation, items } => {
                if Self::is_current(state, generation) {
                    state.items = items;
                    state.loading = false;
                }
                SmallVec::new()
            },
            TicketListAction::SubscriptionFailed { generation, error } => {
                if Self::is_current(state, generation) {
                    tracing::warn!("Ticket list subscription failed: {error}");
                    state.loading = false;
                    state.error = Some(error);
                }
                SmallVec::new()
            },
        }
    }
}

/// Runtime store for the ticket list screen
pub type TicketListStore =
    Store<TicketListState, TicketListAction, TicketListEnvironment, TicketListReducer>;

/// The ticket list screen's handle on the synchronizer.
///
/// Cloning shares the same screen state.
#[derive(Clone)]
pub struct TicketListScreen {
    store: TicketListStore,
    activations: Arc<AtomicU64>,
}

impl TicketListScreen {
    /// Create an inactive list screen
    #[must_use]
    pub fn new(env: TicketListEnvironment, config: StoreConfig) -> Self {
        Self {
            store: Store::with_config(TicketListState::default(), TicketListReducer, env, config),
            activations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Activate the screen with `filter` and start the live query.
    ///
    /// The live query runs until the returned guard is released or dropped.
    /// Activating again supersedes the previous guard.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ShutdownInProgress`] if the screen was shut down.
    pub async fn activate(&self, filter: TicketStatus) -> Result<ActiveSubscription, RuntimeError> {
        let activation = self.activations.fetch_add(1, Ordering::SeqCst) + 1;
        self.store
            .send(TicketListAction::Activate { filter, activation })
            .await?;

        Ok(ActiveSubscription {
            store: self.store.clone(),
            activations: Arc::clone(&self.activations),
            activation,
            released: false,
        })
    }

    /// Switch the status filter
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ShutdownInProgress`] if the screen was shut down.
    pub async fn select_filter(&self, filter: TicketStatus) -> Result<(), RuntimeError> {
        self.store
            .send(TicketListAction::SelectFilter { filter })
            .await
            .map(|_| ())
    }

    /// Current items
    pub async fn items(&self) -> Vec<TicketListItem> {
        self.store.state(|s| s.items.clone()).await
    }

    /// Current screen state
    pub async fn snapshot(&self) -> TicketListState {
        self.store.state(Clone::clone).await
    }

    /// Notified after every state change
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.store.subscribe_state()
    }

    /// Wait until `predicate` holds for the screen state
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Timeout`] if it does not hold in time.
    pub async fn wait_for<F>(&self, predicate: F, timeout: Duration) -> Result<(), RuntimeError>
    where
        F: Fn(&TicketListState) -> bool,
    {
        self.store.wait_for(predicate, timeout).await
    }

    /// Whether a live query is currently running
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.store.active_effects(LIST_SUBSCRIPTION) > 0
    }

    /// Stop the screen, releasing any live query
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ShutdownTimeout`] if effects outlive `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), RuntimeError> {
        self.store.shutdown(timeout).await
    }
}

/// Guard for an active list screen.
///
/// Call [`ActiveSubscription::release`] when the screen becomes inactive.
/// Dropping the guard without releasing cancels the live query immediately.
#[must_use = "dropping the guard releases the live query"]
pub struct ActiveSubscription {
    store: TicketListStore,
    activations: Arc<AtomicU64>,
    activation: u64,
    released: bool,
}

impl ActiveSubscription {
    fn is_latest(&self) -> bool {
        self.activations.load(Ordering::SeqCst) == self.activation
    }

    /// Deactivate the screen.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ShutdownInProgress`] if the screen was shut
    /// down; the live query is cancelled regardless.
    pub async fn release(mut self) -> Result<(), RuntimeError> {
        self.released = true;
        if !self.is_latest() {
            return Ok(());
        }

        let deactivate = TicketListAction::Deactivate {
            activation: self.activation,
        };
        match self.store.send(deactivate).await {
            Ok(_) => Ok(()),
            Err(error) => {
                self.store.cancel(LIST_SUBSCRIPTION);
                Err(error)
            },
        }
    }
}

impl Drop for ActiveSubscription {
    fn drop(&mut self) {
        if self.released || !self.is_latest() {
            return;
        }

        let cancelled = self.store.cancel(LIST_SUBSCRIPTION);
        tracing::debug!(cancelled, "List subscription guard dropped without release");

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let store = self.store.clone();
            let activation = self.activation;
            runtime.spawn(async move {
                let _ = store.send(TicketListAction::Deactivate { activation }).await;
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use helpdesk_core::document_store::TicketPatch;
    use helpdesk_core::ticket::{NewTicket, TicketId};
    use helpdesk_testing::{assertions, test_clock, InMemoryDocumentStore, ReducerTest};

    fn env() -> TicketListEnvironment {
        TicketListEnvironment {
            store: Arc::new(InMemoryDocumentStore::new(Arc::new(test_clock()))),
            format: TimestampFormat::default(),
        }
    }

    fn item(id: &str) -> TicketListItem {
        TicketListItem {
            id: TicketId::new(id),
            patrimony: "1234".to_string(),
            description: "no power".to_string(),
            status: TicketStatus::Open,
            when: "01/01/2025 00:00".to_string(),
        }
    }

    #[test]
    fn activate_replaces_previous_query() {
        ReducerTest::new(TicketListReducer)
            .with_env(env())
            .given_state(TicketListState::default())
            .when_action(TicketListAction::Activate {
                filter: TicketStatus::Open,
                activation: 1,
            })
            .then_state(|state| {
                assert!(state.active);
                assert!(state.loading);
                assert_eq!(state.generation, 1);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_cancels(effects, LIST_SUBSCRIPTION);
                assertions::assert_starts(effects, LIST_SUBSCRIPTION);
            })
            .run();
    }

    #[test]
    fn filter_switch_clears_items() {
        let state = TicketListState {
            active: true,
            generation: 1,
            items: vec![item("a")],
            ..TicketListState::default()
        };

        ReducerTest::new(TicketListReducer)
            .with_env(env())
            .given_state(state)
            .when_action(TicketListAction::SelectFilter {
                filter: TicketStatus::Closed,
            })
            .then_state(|state| {
                assert_eq!(state.filter, TicketStatus::Closed);
                assert!(state.items.is_empty());
                assert_eq!(state.generation, 2);
            })
            .then_effects(|effects| assertions::assert_starts(effects, LIST_SUBSCRIPTION))
            .run();
    }

    #[test]
    fn stale_snapshot_is_discarded() {
        ReducerTest::new(TicketListReducer)
            .with_env(env())
            .given_state(TicketListState::default())
            .when_actions([
                TicketListAction::Activate {
                    filter: TicketStatus::Open,
                    activation: 1,
                },
                TicketListAction::SelectFilter {
                    filter: TicketStatus::Closed,
                },
                TicketListAction::SnapshotReceived {
                    generation: 1,
                    items: vec![item("stale")],
                },
            ])
            .then_state(|state| {
                assert!(state.items.is_empty());
                assert!(state.loading);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failure_keeps_last_items() {
        let state = TicketListState {
            active: true,
            generation: 3,
            items: vec![item("a")],
            ..TicketListState::default()
        };
        let error = StoreError::SubscriptionFailed("permission denied".to_string());

        ReducerTest::new(TicketListReducer)
            .with_env(env())
            .given_state(state)
            .when_action(TicketListAction::SubscriptionFailed {
                generation: 3,
                error: error.clone(),
            })
            .then_state(move |state| {
                assert_eq!(state.items, vec![item("a")]);
                assert_eq!(state.error, Some(error));
                assert!(state.notification().is_some());
            })
            .run();
    }

    #[test]
    fn deactivate_cancels_and_ignores_late_snapshots() {
        ReducerTest::new(TicketListReducer)
            .with_env(env())
            .given_state(TicketListState::default())
            .when_actions([
                TicketListAction::Activate {
                    filter: TicketStatus::Open,
                    activation: 1,
                },
                TicketListAction::Deactivate { activation: 1 },
            ])
            .then_state(|state| assert!(!state.active))
            .then_effects(|effects| assertions::assert_cancels(effects, LIST_SUBSCRIPTION))
            .run();
    }

    #[test]
    fn stale_deactivate_keeps_newer_activation() {
        ReducerTest::new(TicketListReducer)
            .with_env(env())
            .given_state(TicketListState::default())
            .when_actions([
                TicketListAction::Activate {
                    filter: TicketStatus::Open,
                    activation: 1,
                },
                TicketListAction::Activate {
                    filter: TicketStatus::Closed,
                    activation: 2,
                },
                TicketListAction::Deactivate { activation: 1 },
            ])
            .then_state(|state| {
                assert!(state.active);
                assert_eq!(state.activation, 2);
                assert_eq!(state.filter, TicketStatus::Closed);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn late_activate_does_not_take_over() {
        let state = TicketListState {
            active: true,
            activation: 3,
            generation: 1,
            ..TicketListState::default()
        };

        ReducerTest::new(TicketListReducer)
            .with_env(env())
            .given_state(state)
            .when_action(TicketListAction::Activate {
                filter: TicketStatus::Closed,
                activation: 2,
            })
            .then_state(|state| {
                assert_eq!(state.activation, 3);
                assert_eq!(state.filter, TicketStatus::Open);
                assert_eq!(state.generation, 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn screen_follows_commits() {
        let store = InMemoryDocumentStore::new(Arc::new(test_clock()));
        let screen = TicketListScreen::new(
            TicketListEnvironment {
                store: Arc::new(store.clone()),
                format: TimestampFormat::default(),
            },
            StoreConfig::default(),
        );

        let guard = screen.activate(TicketStatus::Open).await.unwrap();
        let id = store.create(NewTicket::new("1234", "no power").unwrap()).await.unwrap();
        screen
            .wait_for(|s| s.items.len() == 1, Duration::from_secs(2))
            .await
            .unwrap();

        store.update(id, TicketPatch::close("fixed")).await.unwrap();
        screen
            .wait_for(|s| s.items.is_empty() && !s.loading, Duration::from_secs(2))
            .await
            .unwrap();

        guard.release().await.unwrap();
        assert!(!screen.is_subscribed());
    }
}
