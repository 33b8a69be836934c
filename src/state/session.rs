//! Session state container for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `Session` per running application, constructed at startup and handed
//! to every view that needs identity. Views subscribe to a `watch` channel
//! and re-render on change; only the operations below write.
//!
//! LIFECYCLE
//! =========
//! `Resolving` (loading, one startup `GET /api/me` in flight) settles exactly
//! once into `Authenticated(user)` or `Anonymous`. Any startup failure means
//! anonymous; failures that are not a server refusal are kept in
//! `check_error` so a view can tell an outage from a logged-out visitor.
//!
//! ORDERING
//! ========
//! Every mutating call takes a generation number before it goes to the
//! network. A successful response is applied only if it is newer than the
//! last one applied, so overlapping login/logout settle on the last call
//! issued rather than the last response to arrive. A failed call applies
//! nothing and fences nothing. Errors always reach the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::nav::{Navigator, Route};
use crate::net::auth::AuthClient;
use crate::net::error::ApiError;
use crate::net::types::{LoginRequest, RegisterRequest, User};

/// Generation held by the startup check; any applied operation supersedes it.
const STARTUP_GENERATION: u64 = 0;

// =============================================================================
// STATE
// =============================================================================

/// Snapshot published to views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    /// True only while the startup check is in flight.
    pub loading: bool,
    /// Startup check failure that was not a server refusal.
    pub check_error: Option<ApiError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Resolving,
    Authenticated,
    Anonymous,
}

impl SessionState {
    #[must_use]
    pub fn resolving() -> Self {
        Self { user: None, loading: true, check_error: None }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.user, self.loading) {
            (Some(_), _) => SessionPhase::Authenticated,
            (None, true) => SessionPhase::Resolving,
            (None, false) => SessionPhase::Anonymous,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::resolving()
    }
}

// =============================================================================
// CONTAINER
// =============================================================================

struct SessionInner {
    auth: AuthClient,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
    /// Last generation handed out.
    issued: AtomicU64,
    /// Highest generation whose response changed state. Written only inside
    /// the `watch` write lock.
    applied: AtomicU64,
    startup: Mutex<Option<JoinHandle<()>>>,
}

impl SessionInner {
    fn settle_startup(&self, result: Result<User, ApiError>) {
        self.state.send_modify(|state| {
            state.loading = false;
            if self.applied.load(Ordering::SeqCst) != STARTUP_GENERATION {
                tracing::debug!("startup session check superseded");
                return;
            }
            match result {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, "session resolved: authenticated");
                    state.user = Some(user);
                    state.check_error = None;
                }
                Err(err) if err.is_rejection() => {
                    tracing::info!("session resolved: anonymous");
                    state.user = None;
                    state.check_error = None;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "session check failed; treating as anonymous");
                    state.user = None;
                    state.check_error = Some(err);
                }
            }
        });
    }

    /// Apply `user` if `generation` is newer than every applied response.
    fn apply(&self, generation: u64, user: Option<User>) -> bool {
        self.state.send_if_modified(|state| {
            if generation <= self.applied.load(Ordering::SeqCst) {
                return false;
            }
            self.applied.store(generation, Ordering::SeqCst);
            state.user = user;
            state.check_error = None;
            true
        })
    }
}

/// Shared handle to the session container. Clones observe the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create the container and launch its one-time startup check.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start<N: Navigator + 'static>(auth: AuthClient, navigator: N) -> Self {
        let (state, _) = watch::channel(SessionState::resolving());
        let inner = Arc::new(SessionInner {
            auth,
            navigator: Arc::new(navigator),
            state,
            issued: AtomicU64::new(STARTUP_GENERATION),
            applied: AtomicU64::new(STARTUP_GENERATION),
            startup: Mutex::new(None),
        });

        let task_inner = Arc::clone(&inner);
        let handle = tokio::spawn(async move {
            let result = task_inner.auth.current_user().await.map(|resp| resp.user);
            task_inner.settle_startup(result);
        });
        *inner.startup.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Self { inner }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Receiver that observes every published state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Wait for the startup check to settle and return the resolved snapshot.
    pub async fn ready(&self) -> SessionState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Sign in; on success the user becomes current and the dashboard is requested.
    ///
    /// # Errors
    ///
    /// Returns the auth call's error; state is left unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let generation = self.next_generation();
        let request = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let response = self.inner.auth.login(&request).await?;
        Ok(self.finish_sign_in(generation, response.user, "login"))
    }

    /// Create an account; on success behaves like [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns the auth call's error; state is left unchanged.
    pub async fn register(&self, email: &str, password: &str, name: Option<&str>) -> Result<User, ApiError> {
        let generation = self.next_generation();
        let request = RegisterRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            name: name.map(str::to_owned),
        };
        let response = self.inner.auth.register(&request).await?;
        Ok(self.finish_sign_in(generation, response.user, "register"))
    }

    /// Sign out; on success the user is cleared and the sign-in page is requested.
    ///
    /// # Errors
    ///
    /// Returns the auth call's error. A failed logout keeps the current user.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let generation = self.next_generation();
        self.inner.auth.logout().await?;
        if self.inner.apply(generation, None) {
            tracing::info!("session ended");
            self.inner.navigator.navigate(Route::Login);
        } else {
            tracing::debug!(generation, "stale logout response dropped");
        }
        Ok(())
    }

    /// Abort an in-flight startup check. An unsettled session stops loading
    /// with whatever user a later operation already set, usually none.
    pub fn shutdown(&self) {
        let handle = self.inner.startup.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            handle.abort();
        }
        self.inner.state.send_if_modified(|state| {
            if !state.loading {
                return false;
            }
            state.loading = false;
            true
        });
    }

    fn next_generation(&self) -> u64 {
        self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn finish_sign_in(&self, generation: u64, user: User, op: &'static str) -> User {
        if self.inner.apply(generation, Some(user.clone())) {
            tracing::info!(user_id = %user.id, op, "session authenticated");
            self.inner.navigator.navigate(Route::Dashboard);
        } else {
            tracing::debug!(generation, op, "stale sign-in response dropped");
        }
        user
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
