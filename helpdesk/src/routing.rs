//! Routing Gate.
//!
//! Chooses between the authenticated app and the sign-in flow, driven only
//! by session notifications:
//!
//! ```text
//!            first emission
//! Loading ─────────────────────┬──► Authenticated { session }
//!                              └──► Unauthenticated
//! ```
//!
//! `Loading` is left on the first emission and never re-entered; nothing is
//! rendered while in it.

use crate::session::SessionSubscription;
use helpdesk_core::effect::Effect;
use helpdesk_core::reducer::Reducer;
use helpdesk_core::session::Session;
use helpdesk_runtime::{RuntimeError, Store, StoreConfig};
use smallvec::SmallVec;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Which flow is on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// The authenticated app
    App,
    /// The sign-in flow
    SignIn,
}

/// Routing state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Route {
    /// No session emission yet
    #[default]
    Loading,
    /// A user is signed in
    Authenticated {
        /// The signed-in session
        session: Session,
    },
    /// Nobody is signed in
    Unauthenticated,
}

impl Route {
    /// Screen to render; `None` while loading
    #[must_use]
    pub const fn screen(&self) -> Option<Screen> {
        match self {
            Self::Loading => None,
            Self::Authenticated { .. } => Some(Screen::App),
            Self::Unauthenticated => Some(Screen::SignIn),
        }
    }

    /// The signed-in session, if any
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated { session } => Some(session),
            Self::Loading | Self::Unauthenticated => None,
        }
    }
}

/// Routing actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAction {
    /// The Session Manager reported a session change
    SessionChanged(Option<Session>),
}

/// Reducer for [`Route`]
#[derive(Clone, Copy, Debug, Default)]
pub struct RouteReducer;

impl Reducer for RouteReducer {
    type State = Route;
    type Action = RouteAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Route,
        action: RouteAction,
        _env: &(),
    ) -> SmallVec<[Effect<RouteAction>; 4]> {
        match action {
            RouteAction::SessionChanged(Some(session)) => {
                *state = Route::Authenticated { session };
            },
            RouteAction::SessionChanged(None) => {
                *state = Route::Unauthenticated;
            },
        }
        SmallVec::new()
    }
}

/// Runtime store for routing
pub type RouteStore = Store<Route, RouteAction, (), RouteReducer>;

/// Routing Gate: feeds session notifications into the route.
///
/// Dropping the gate stops following the session.
pub struct RoutingGate {
    store: RouteStore,
    pump: JoinHandle<()>,
}

impl RoutingGate {
    /// Start routing from `subscription`
    #[must_use]
    pub fn spawn(mut subscription: SessionSubscription, config: StoreConfig) -> Self {
        let store = Store::with_config(Route::Loading, RouteReducer, (), config);

        let pump_store = store.clone();
        let pump = tokio::spawn(async move {
            while let Some(session) = subscription.next().await {
                if let Err(error) = pump_store.send(RouteAction::SessionChanged(session)).await {
                    tracing::debug!(%error, "Routing gate stopped");
                    break;
                }
            }
        });

        Self { store, pump }
    }

    /// Current route
    pub async fn route(&self) -> Route {
        self.store.state(Clone::clone).await
    }

    /// Screen to render; `None` while loading
    pub async fn screen(&self) -> Option<Screen> {
        self.store.state(Route::screen).await
    }

    /// Notified after every route change
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.store.subscribe_state()
    }

    /// Wait until the gate renders `screen`
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Timeout`] if it does not happen in time.
    pub async fn wait_for_screen(&self, screen: Screen, timeout: Duration) -> Result<(), RuntimeError> {
        self.store
            .wait_for(|route| route.screen() == Some(screen), timeout)
            .await
    }
}

impl Drop for RoutingGate {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_core::session::UserId;
    use helpdesk_testing::{assertions, ReducerTest};

    fn session() -> Session {
        Session::new(UserId::new("u-1"))
    }

    #[test]
    fn nothing_renders_while_loading() {
        assert_eq!(Route::Loading.screen(), None);
    }

    #[test]
    fn first_emission_leaves_loading() {
        ReducerTest::new(RouteReducer)
            .with_env(())
            .given_state(Route::Loading)
            .when_action(RouteAction::SessionChanged(Some(session())))
            .then_state(|route| {
                assert_eq!(route.screen(), Some(Screen::App));
                assert_eq!(route.session(), Some(&session()));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn sign_out_routes_to_sign_in() {
        ReducerTest::new(RouteReducer)
            .with_env(())
            .given_state(Route::Loading)
            .when_actions([
                RouteAction::SessionChanged(Some(session())),
                RouteAction::SessionChanged(None),
            ])
            .then_state(|route| assert_eq!(*route, Route::Unauthenticated))
            .run();
    }
}
