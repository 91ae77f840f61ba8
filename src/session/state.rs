//! Derived auth view and session event payloads.

use crate::types::User;

/// Typed payloads broadcast to every subscriber of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: i64 },
    LoggedOut,
    /// The backend rejected the token; the session was cleared.
    Unauthorized,
    ProfileUpdated { user_id: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Unhydrated,
    Checking,
    LoggedIn,
    LoggedOut,
}

/// Single auth tuple consumed by every front end.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    /// True before hydration and while the profile fetch is in flight.
    pub is_loading: bool,
    pub is_hydrated: bool,
    /// A profile snapshot is present.
    pub is_authenticated: bool,
    pub has_token: bool,
    pub is_logged_in: bool,
    /// Last non-auth profile fetch failure, cleared on the next attempt.
    pub last_error: Option<String>,
}

impl AuthState {
    /// Combine the three inputs into the consumer-facing view.
    #[must_use]
    pub fn derive(
        user: Option<User>,
        is_hydrated: bool,
        has_token: bool,
        fetching: bool,
        last_error: Option<String>,
    ) -> Self {
        let is_authenticated = user.is_some();
        Self {
            user,
            is_loading: fetching || !is_hydrated,
            is_hydrated,
            is_authenticated,
            has_token,
            is_logged_in: is_hydrated && has_token && (fetching || is_authenticated),
            last_error,
        }
    }

    #[must_use]
    pub fn unhydrated() -> Self {
        Self::derive(None, false, false, false, None)
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if !self.is_hydrated {
            SessionPhase::Unhydrated
        } else if self.is_logged_in && self.is_loading {
            SessionPhase::Checking
        } else if self.is_logged_in {
            SessionPhase::LoggedIn
        } else {
            SessionPhase::LoggedOut
        }
    }

    /// Gated views should send the user to login once loading has settled.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        !self.is_loading && !self.is_authenticated
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::unhydrated()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
