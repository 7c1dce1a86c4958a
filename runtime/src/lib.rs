//! # Helpdesk Runtime
//!
//! Store runtime for helpdesk reducers.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling for every screen of the helpdesk.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Cancellation**: Tears down live subscriptions; feedback from cancelled
//!   effects never reaches the reducer
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_runtime::Store;
//!
//! let store = Store::new(TicketListState::default(), TicketListReducer, env);
//!
//! // Send an action
//! store.send(TicketListAction::SelectFilter { filter: TicketStatus::Closed }).await?;
//!
//! // Read state
//! let items = store.state(|s| s.items.clone()).await;
//! ```

use helpdesk_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::AbortHandle;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum RuntimeError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for an action or a state condition
        #[error("Timeout waiting for store")]
        Timeout,

        /// Broadcast or state channel closed
        ///
        /// The channel was closed, typically because the store is shutting down.
        #[error("Store channel closed")]
        ChannelClosed,
    }
}

pub use error::RuntimeError;

/// Configuration for Store behavior
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(2));
///
/// let store = Store::with_config(state, reducer, env, config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the action broadcast channel
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects of one
/// action to complete. Stream effects complete when their stream ends or is
/// cancelled.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(DetailAction::Load).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The load effect has finished and its result was reduced
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle and its tracking counterpart
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Timeout`] if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), RuntimeError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| RuntimeError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Runs when the effect finishes, panics, or its task is aborted.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: one registration of a cancellable effect
///
/// Every task spawned for the effect is tracked so cancellation can abort
/// it. The `live` flag is checked under the state lock before any action
/// produced by the effect is reduced, so an action already in flight when
/// the effect is cancelled is discarded.
#[derive(Clone)]
struct CancellationScope {
    live: Arc<AtomicBool>,
    tasks: Arc<Mutex<Vec<AbortHandle>>>,
}

impl CancellationScope {
    fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Live and still running at least one task (or not started yet)
    fn is_active(&self) -> bool {
        if !self.is_live() {
            return false;
        }
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.is_empty() || tasks.iter().any(|task| !task.is_finished())
    }

    fn track(&self, task: AbortHandle) {
        if self.is_live() {
            self.tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(task);
        } else {
            task.abort();
        }
    }

    fn cancel(&self) {
        self.live.store(false, Ordering::Release);
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            task.abort();
        }
    }
}

fn all_live(scopes: &[CancellationScope]) -> bool {
    scopes.iter().all(CancellationScope::is_live)
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        all_live, Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, CancellationScope,
        DecrementGuard, Duration, Effect, EffectHandle, EffectId, EffectTracking, HashMap, Mutex,
        Ordering, PoisonError, Reducer, RuntimeError, RwLock, StoreConfig,
    };
    use futures::StreamExt;
    use tokio::sync::{broadcast, watch};

    type Cancellations = Arc<Mutex<HashMap<EffectId, Vec<CancellationScope>>>>;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. Cancellation of long-lived effects
    ///
    /// Reducer steps are serialized by the state lock, which gives every
    /// screen the single logical thread its state machine assumes.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        config: StoreConfig,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellations: Cancellations,
        /// Action broadcast channel for observing actions produced by effects.
        action_broadcast: broadcast::Sender<A>,
        /// Bumped after every reducer step; lets observers re-render.
        state_version: Arc<watch::Sender<u64>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new store with custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));
            let (state_version, _) = watch::channel(0);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellations: Arc::new(Mutex::new(HashMap::new())),
                action_broadcast,
                state_version: Arc::new(state_version),
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the state write lock
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Starts the returned effects (cancellations are applied before the lock is released)
        /// 4. Effects may produce more actions (feedback loop)
        ///
        /// `send()` returns after starting effect execution, not completion.
        ///
        /// # Errors
        ///
        /// Returns [`RuntimeError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, RuntimeError> {
            self.send_internal(action, Vec::new(), false).await
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast BEFORE sending to avoid races,
        /// then returns the first action produced by an effect that matches
        /// `predicate`.
        ///
        /// # Errors
        ///
        /// - [`RuntimeError::Timeout`]: Timeout expired before matching action received
        /// - [`RuntimeError::ChannelClosed`]: Action broadcast channel closed
        /// - [`RuntimeError::ShutdownInProgress`]: Store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, RuntimeError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged, {} actions skipped", skipped);
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(RuntimeError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| RuntimeError::Timeout)?
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Actions from cancelled effects are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Subscribe to state changes
        ///
        /// The value is a version number bumped after every reducer step.
        #[must_use]
        pub fn subscribe_state(&self) -> watch::Receiver<u64> {
            self.state_version.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.items.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Wait until `predicate` holds for the current state
        ///
        /// # Errors
        ///
        /// - [`RuntimeError::Timeout`]: the predicate did not hold in time
        /// - [`RuntimeError::ChannelClosed`]: the store was dropped
        pub async fn wait_for<F>(&self, predicate: F, timeout: Duration) -> Result<(), RuntimeError>
        where
            F: Fn(&S) -> bool,
        {
            let mut versions = self.state_version.subscribe();

            tokio::time::timeout(timeout, async {
                loop {
                    if self.state(&predicate).await {
                        return Ok(());
                    }
                    if versions.changed().await.is_err() {
                        return Err(RuntimeError::ChannelClosed);
                    }
                }
            })
            .await
            .map_err(|_| RuntimeError::Timeout)?
        }

        /// Cancel every running effect registered under `id`
        ///
        /// Synchronous so it can run from `Drop`. Returns the number of
        /// registrations cancelled.
        pub fn cancel(&self, id: EffectId) -> usize {
            let scopes = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id)
                .unwrap_or_default();

            for scope in &scopes {
                scope.cancel();
            }

            if !scopes.is_empty() {
                tracing::debug!(effect_id = %id, count = scopes.len(), "Cancelled effect");
                metrics::counter!("store.effects.cancelled").increment(scopes.len() as u64);
            }
            scopes.len()
        }

        /// Number of live, unfinished effects registered under `id`
        #[must_use]
        pub fn active_effects(&self, id: EffectId) -> usize {
            self.cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&id)
                .map_or(0, |scopes| scopes.iter().filter(|scope| scope.is_active()).count())
        }

        /// Number of effects still running (all kinds)
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::SeqCst)
        }

        /// Initiate graceful shutdown
        ///
        /// Rejects new actions, cancels every cancellable effect, then waits
        /// for the remaining effects to finish.
        ///
        /// # Errors
        ///
        /// Returns [`RuntimeError::ShutdownTimeout`] if effects are still running after `timeout`.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), RuntimeError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let ids: Vec<EffectId> = self
                .cancellations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .keys()
                .copied()
                .collect();
            for id in ids {
                self.cancel(id);
            }

            let start = tokio::time::Instant::now();
            loop {
                let pending = self.pending_effects.load(Ordering::SeqCst);
                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }
                if start.elapsed() >= timeout {
                    tracing::error!(pending, "Shutdown timed out with effects still running");
                    return Err(RuntimeError::ShutdownTimeout(pending));
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }

        /// Graceful shutdown with the configured default timeout
        ///
        /// # Errors
        ///
        /// See [`Store::shutdown`].
        pub async fn shutdown_default(&self) -> Result<(), RuntimeError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        /// Internal send implementation
        ///
        /// `scopes` are the cancellation scopes of the effect that produced
        /// the action (empty for actions sent from outside). If any of them
        /// was cancelled, the action is discarded under the state lock.
        #[tracing::instrument(skip(self, action, scopes), name = "store_send_internal")]
        async fn send_internal(
            &self,
            action: A,
            scopes: Vec<CancellationScope>,
            from_effect: bool,
        ) -> Result<EffectHandle, RuntimeError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(RuntimeError::ShutdownInProgress);
            }

            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            if !all_live(&scopes) {
                tracing::trace!("Discarding action from cancelled effect");
                metrics::counter!("store.feedback.discarded").increment(1);
                return Ok(EffectHandle::completed());
            }

            if from_effect {
                let _ = self.action_broadcast.send(action.clone());
            }

            metrics::counter!("store.commands.total").increment(1);
            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            self.state_version.send_modify(|version| *version += 1);

            // Started while the lock is held: a Cancel takes effect before any
            // other action can be reduced.
            for effect in effects {
                self.execute_effect(effect, tracking.clone(), &[]);
            }
            drop(state);

            Ok(handle)
        }

        /// Feed an action produced by an effect back into the store
        async fn feed_back(&self, action: A, scopes: Vec<CancellationScope>) {
            if let Err(error) = self.send_internal(action, scopes, true).await {
                tracing::debug!(%error, "Dropped effect feedback");
            }
        }

        fn spawn_tracked<F>(&self, tracking: &EffectTracking, scopes: &[CancellationScope], task: F)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);

            let guard = DecrementGuard(tracking.clone());
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

            let handle = tokio::spawn(async move {
                let _guard = guard;
                let _pending_guard = pending_guard;
                task.await;
            });

            for scope in scopes {
                scope.track(handle.abort_handle());
            }
        }

        /// Execute an effect with tracking
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, sends resulting action if `Some`
        /// - `Stream`: Feeds every item back, in order, until the stream ends
        /// - `Parallel`: Executes effects concurrently
        /// - `Sequential`: Executes effects in order, waiting for each to complete
        /// - `Cancellable`: Registers a cancellation scope, then executes the inner effect
        /// - `Cancel`: Cancels every scope registered under the id
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into spawned tasks
        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking, scopes: &[CancellationScope]) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                    let store = self.clone();
                    let task_scopes = scopes.to_vec();
                    self.spawn_tracked(&tracking, scopes, async move {
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            store.feed_back(action, task_scopes).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
                Effect::Stream(mut stream) => {
                    tracing::trace!("Executing Effect::Stream");
                    metrics::counter!("store.effects.executed", "type" => "stream").increment(1);

                    let store = self.clone();
                    let task_scopes = scopes.to_vec();
                    self.spawn_tracked(&tracking, scopes, async move {
                        while let Some(action) = stream.next().await {
                            if !all_live(&task_scopes) {
                                tracing::trace!("Stream cancelled, dropping remaining items");
                                break;
                            }
                            store.feed_back(action, task_scopes.clone()).await;
                        }
                        tracing::trace!("Effect::Stream completed");
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                    for effect in effects {
                        self.execute_effect(effect, tracking.clone(), scopes);
                    }
                },
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                    metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);

                    let store = self.clone();
                    let task_scopes = scopes.to_vec();
                    self.spawn_tracked(&tracking, scopes, async move {
                        for (idx, effect) in effects.into_iter().enumerate() {
                            if !all_live(&task_scopes) {
                                break;
                            }
                            tracing::trace!("Executing sequential effect {} of {}", idx + 1, effect_count);

                            let (mut sub_handle, sub_tracking) = EffectHandle::new();
                            store.execute_effect(effect, sub_tracking, &task_scopes);
                            sub_handle.wait().await;
                        }
                        tracing::trace!("Effect::Sequential completed");
                    });
                },
                Effect::Cancellable { id, effect } => {
                    tracing::trace!(effect_id = %id, "Registering cancellable effect");
                    let scope = CancellationScope::new();
                    {
                        let mut registry = self
                            .cancellations
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner);
                        let registered = registry.entry(id).or_default();
                        registered.retain(CancellationScope::is_active);
                        registered.push(scope.clone());
                    }

                    let mut nested = scopes.to_vec();
                    nested.push(scope);
                    self.execute_effect(*effect, tracking, &nested);
                },
                Effect::Cancel(id) => {
                    tracing::trace!(effect_id = %id, "Executing Effect::Cancel");
                    self.cancel(id);
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                config: self.config.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellations: Arc::clone(&self.cancellations),
                action_broadcast: self.action_broadcast.clone(),
                state_version: Arc::clone(&self.state_version),
            }
        }
    }
}

pub use store::Store;
