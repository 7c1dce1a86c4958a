//! # Helpdesk Core
//!
//! Core traits and domain types for the helpdesk ticket lifecycle.
//!
//! This crate provides the abstractions every other crate in the workspace
//! builds on: the Reducer pattern used to model each screen as a state
//! machine, the effect descriptions reducers return, and the domain model of
//! service-request tickets together with the two external collaborators the
//! system talks to (an authentication provider and a document store).
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature (a screen, the routing gate)
//! - **Action**: All possible inputs to a reducer (user intents, remote results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Domain
//!
//! - [`ticket`]: tickets, their lifecycle and read-only projections
//! - [`session`]: the authenticated-user context
//! - [`auth`]: the [`AuthProvider`](auth::AuthProvider) collaborator
//! - [`document_store`]: the [`DocumentStore`](document_store::DocumentStore) collaborator
//! - [`format`]: the single timestamp formatting rule shared by all projections
//! - [`error`]: the error taxonomy
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_core::*;
//!
//! impl Reducer for RouteReducer {
//!     type State = Route;
//!     type Action = RouteAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Route,
//!         action: RouteAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<RouteAction>; 4]> {
//!         // Transition logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

pub mod auth;
pub mod document_store;
pub mod error;
pub mod format;
pub mod session;
pub mod ticket;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all state-machine logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for TicketListReducer {
    ///     type State = TicketListState;
    ///     type Action = TicketListAction;
    ///     type Environment = TicketListEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut TicketListState,
    ///         action: TicketListAction,
    ///         env: &TicketListEnvironment,
    ///     ) -> SmallVec<[Effect<TicketListAction>; 4]> {
    ///         match action {
    ///             TicketListAction::Activate { .. } => {
    ///                 // Start the live subscription here
    ///                 SmallVec::new()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use futures::Stream;
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;

    /// Identifier used to cancel a running effect.
    ///
    /// Reducers tag long-lived effects (live subscriptions) with an id and
    /// later emit [`Effect::Cancel`] with the same id to tear them down.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create an effect id from a static name
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The id's name
        #[must_use]
        pub const fn as_str(&self) -> &'static str {
            self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Long-lived async computation producing many actions
        ///
        /// Every item is fed back into the reducer, in order, until the stream ends.
        Stream(Pin<Box<dyn Stream<Item = Action> + Send>>),

        /// Run the inner effect under `id` so it can be cancelled later
        Cancellable {
            /// Cancellation id
            id: EffectId,
            /// The effect to run
            effect: Box<Effect<Action>>,
        },

        /// Cancel every running effect registered under the id
        ///
        /// Once cancelled, actions still produced by the effect are discarded
        /// by the runtime and never reach the reducer.
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Stream(_) => write!(f, "Effect::Stream(<stream>)"),
                Effect::Cancellable { id, effect } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Make this effect cancellable under `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId) -> Effect<Action> {
            Effect::Cancellable {
                id,
                effect: Box::new(self),
            }
        }

        /// Returns `true` if this effect cancels `id`
        #[must_use]
        pub fn cancels(&self, id: EffectId) -> bool {
            matches!(self, Effect::Cancel(cancelled) if *cancelled == id)
        }

        /// Returns `true` if this effect is registered under `id`
        #[must_use]
        pub fn is_cancellable_as(&self, id: EffectId) -> bool {
            matches!(self, Effect::Cancellable { id: registered, .. } if *registered == id)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Document stores use a clock to resolve server-assigned timestamps;
    /// tests substitute a fixed clock.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{Effect, EffectId};

    const LIST: EffectId = EffectId::new("ticket-list");

    #[test]
    fn cancellable_wraps_effect_under_id() {
        let effect: Effect<()> = Effect::None.cancellable(LIST);
        assert!(effect.is_cancellable_as(LIST));
        assert!(!effect.is_cancellable_as(EffectId::new("other")));
    }

    #[test]
    fn cancel_matches_only_its_id() {
        let effect: Effect<()> = Effect::Cancel(LIST);
        assert!(effect.cancels(LIST));
        assert!(!effect.cancels(EffectId::new("other")));
        assert_eq!(format!("{effect:?}"), "Effect::Cancel(EffectId(\"ticket-list\"))");
    }
}
