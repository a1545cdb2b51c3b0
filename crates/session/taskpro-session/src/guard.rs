//! Route protection driven by the session store.

use crate::store::{SessionState, SessionStore};
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Route {
    /// Map a path to a route. Unknown paths land on the login page.
    pub fn parse(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            _ => Route::Login,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Authenticated,
    Unauthenticated,
}

/// What to show for a protected route. Exactly one variant is produced.
#[derive(Debug, PartialEq, Eq)]
pub enum GuardOutcome<V> {
    Loading,
    Render(V),
    Redirect(Route),
}

/// Gate for one mounted protected view.
///
/// Reports [`GuardState::Checking`] until the store finishes restoring, then
/// latches: a mount never goes back to checking. After that it follows the
/// live authentication status, so a later logout redirects.
pub struct RouteGuard {
    session: watch::Receiver<SessionState>,
    settled: bool,
}

impl RouteGuard {
    pub fn mount(store: &SessionStore) -> Self {
        Self {
            session: store.subscribe(),
            settled: false,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn state(&mut self) -> GuardState {
        let session = self.session.borrow();

        if !self.settled {
            if session.restoring {
                return GuardState::Checking;
            }
            self.settled = true;
            debug!(authenticated = session.is_authenticated(), "Route guard settled");
        }

        if session.is_authenticated() {
            GuardState::Authenticated
        } else {
            GuardState::Unauthenticated
        }
    }

    /// Wait for the session restore to finish and return the settled state.
    pub async fn settled(&mut self) -> GuardState {
        if !self.settled && self.session.wait_for(|s| !s.restoring).await.is_err() {
            warn!("Session store dropped before restore finished");
            self.settled = true;
        }
        self.state()
    }

    /// Decide between the loading placeholder, the protected view, or a redirect
    /// to the login page. `render` only runs when the view is shown.
    pub fn resolve<V>(&mut self, render: impl FnOnce() -> V) -> GuardOutcome<V> {
        match self.state() {
            GuardState::Checking => GuardOutcome::Loading,
            GuardState::Authenticated => GuardOutcome::Render(render()),
            GuardState::Unauthenticated => GuardOutcome::Redirect(Route::Login),
        }
    }
}
