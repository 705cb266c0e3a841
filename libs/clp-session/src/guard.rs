//! Role- and expiry-based access control for protected operations.
//!
//! The guard owns the current session and its persisted record. Before
//! any protected work it re-checks the token expiry and clears a stale
//! session, so the decision it returns is always made against fresh
//! state within the same pass.

use crate::store::{AuthSession, SessionStore, StoreError};
use crate::token;
use clp_common::types::Role;
use tracing::{info, warn};

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Role),
}

/// Outcome of a route authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

/// Login screen an unauthenticated visitor of `path` is sent to, derived
/// from the first path segment. Unknown families default to the student
/// login.
pub fn login_route_for(path: &str) -> &'static str {
    let family = path.trim_start_matches('/').split('/').next().unwrap_or("");
    match Role::from_path_segment(family) {
        Some(role) => role.login_route(),
        None => Role::Student.login_route(),
    }
}

pub struct SessionGuard {
    store: SessionStore,
    current: Option<AuthSession>,
}

impl SessionGuard {
    /// Create a guard, restoring any previously persisted session.
    pub fn new(store: SessionStore) -> Self {
        let current = store.read();
        Self { store, current }
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.current.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn state(&self) -> SessionState {
        match &self.current {
            Some(session) => SessionState::Authenticated(session.role),
            None => SessionState::Unauthenticated,
        }
    }

    /// Store freshly issued credentials, replacing any previous session.
    pub fn login(&mut self, session: AuthSession) -> Result<(), StoreError> {
        self.store.write(&session)?;
        info!(role = %session.role, "Session established");
        self.current = Some(session);
        Ok(())
    }

    /// Drop the session in memory and on disk. Used for explicit logout
    /// and whenever the backend rejects the token. A failing store clear
    /// is logged, not surfaced: the in-memory session is gone either way.
    pub fn logout(&mut self) {
        self.current = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to remove stored session record");
        }
    }

    /// Expire a stale session before it is used. Must run ahead of every
    /// protected operation; the clearing side effect is visible to the
    /// decision made in the same pass.
    pub fn check_expiry(&mut self, now: i64) -> SessionState {
        if let Some(session) = &self.current {
            if token::is_expired(&session.token, now) {
                info!(role = %session.role, "Session token expired, logging out");
                self.logout();
            }
        }
        self.state()
    }

    /// Decide whether the current session may enter `path`, which
    /// requires `required`. Expired sessions are cleared first; a role
    /// mismatch redirects to the holder's own home, never to another
    /// family's login.
    pub fn authorize(&mut self, path: &str, required: Role, now: i64) -> RouteDecision {
        match self.check_expiry(now) {
            SessionState::Unauthenticated => {
                RouteDecision::Redirect(login_route_for(path).to_string())
            }
            SessionState::Authenticated(role) if role == required => RouteDecision::Allow,
            SessionState::Authenticated(role) => {
                RouteDecision::Redirect(role.home_route().to_string())
            }
        }
    }
}
