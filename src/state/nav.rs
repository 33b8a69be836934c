//! Navigation intents emitted by the session container.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page router is an external collaborator. The container only says
//! where to go; a [`Navigator`] decides how. Route guards use the helpers
//! below so every view applies identical redirect behavior.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::fmt;

use super::session::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public landing page.
    Home,
    /// Public sign-in page.
    Login,
    /// Protected area for authenticated users.
    Dashboard,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receiver of navigation intents.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<F> Navigator for F
where
    F: Fn(Route) + Send + Sync,
{
    fn navigate(&self, route: Route) {
        self(route);
    }
}

/// Root-route rule: once resolved, authenticated users belong on the dashboard.
#[must_use]
pub fn landing_redirect(state: &SessionState) -> Option<Route> {
    (!state.loading && state.user.is_some()).then_some(Route::Dashboard)
}

/// Protected-route rule: redirect to sign-in once resolved without a user.
#[must_use]
pub fn should_redirect_unauth(state: &SessionState) -> bool {
    !state.loading && state.user.is_none()
}
