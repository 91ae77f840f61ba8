//! Session context: token presence, profile cache and auth fan-out.
//!
//! ARCHITECTURE
//! ============
//! One `SessionContext` is created per process and passed explicitly to every
//! consumer. It owns:
//! - the token store (persisted bearer token),
//! - the query cache (profile snapshot plus any cached backend reads),
//! - a `watch` channel carrying the derived [`AuthState`],
//! - a `broadcast` channel carrying typed [`SessionEvent`]s.
//!
//! Consumers never poll storage: they hold an [`AuthHandle`] and observe the
//! watch channel, so a logout or a 401 reaches every mounted consumer.
//!
//! ORDERING
//! ========
//! Token removal, cache clear, epoch bump and state publication happen under
//! one write lock. A profile fetch records the epoch it started in and drops
//! its result if an invalidation happened meanwhile, so no reader observes
//! "authenticated" after a 401.

pub mod state;

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, broadcast, watch};

use crate::cache::{QueryCache, QueryKey};
use crate::error::ApiError;
use crate::token::TokenStore;
use crate::types::{LoginResponse, User};

pub use state::{AuthState, SessionEvent, SessionPhase};

const EVENT_CAPACITY: usize = 64;

/// Source of the current user's profile.
#[async_trait::async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile for the stored token. Must report HTTP 401 as
    /// [`ApiError::Unauthorized`] and must not retry.
    async fn fetch_current_user(&self) -> Result<User, ApiError>;
}

// =============================================================================
// CONTEXT
// =============================================================================

#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn TokenStore>,
    core: RwLock<SessionCore>,
    state_tx: watch::Sender<AuthState>,
    events_tx: broadcast::Sender<SessionEvent>,
    /// Serializes profile fetches so concurrent consumers share one request.
    fetch_gate: Mutex<()>,
}

struct SessionCore {
    hydrated: bool,
    has_token: bool,
    fetching: bool,
    /// Bumped on every login/logout/401; stale fetch results are discarded.
    epoch: u64,
    /// Epoch in which a profile fetch last settled.
    settled_epoch: Option<u64>,
    last_error: Option<String>,
    cache: QueryCache,
}

impl SessionCore {
    fn auth_state(&self) -> AuthState {
        AuthState::derive(
            self.cache.get_as::<User>(&QueryKey::me()),
            self.hydrated,
            self.has_token,
            self.fetching,
            self.last_error.clone(),
        )
    }
}

impl SessionContext {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::unhydrated());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                store,
                core: RwLock::new(SessionCore {
                    hydrated: false,
                    has_token: false,
                    fetching: false,
                    epoch: 0,
                    settled_epoch: None,
                    last_error: None,
                    cache: QueryCache::new(),
                }),
                state_tx,
                events_tx,
                fetch_gate: Mutex::new(()),
            }),
        }
    }

    fn write_core(&self) -> RwLockWriteGuard<'_, SessionCore> {
        self.inner.core.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, core: &SessionCore) {
        self.inner.state_tx.send_replace(core.auth_state());
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; state is still published through the watch.
        let _ = self.inner.events_tx.send(event);
    }

    // -------------------------------------------------------------------------
    // reads
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner.state_tx.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state().phase()
    }

    /// Current bearer token straight from the store.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.store.token()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner.store.is_authenticated()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state().user
    }

    /// Attach a new consumer.
    #[must_use]
    pub fn subscribe(&self) -> AuthHandle {
        AuthHandle { state: self.inner.state_tx.subscribe(), events: self.inner.events_tx.subscribe() }
    }

    /// Raw event stream without the state view.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events_tx.subscribe()
    }

    // -------------------------------------------------------------------------
    // hydration and profile fetch
    // -------------------------------------------------------------------------

    /// Read token presence once and, if a token exists, load the profile.
    ///
    /// Without a token no profile fetch is issued.
    pub async fn hydrate(&self, source: &dyn ProfileSource) -> AuthState {
        {
            let mut core = self.write_core();
            if !core.hydrated {
                core.hydrated = true;
                core.has_token = self.inner.store.is_authenticated();
                // With a token the first published phase is Checking, never LoggedOut.
                core.fetching = core.has_token;
                tracing::debug!(has_token = core.has_token, "session hydrated");
                self.publish(&core);
            }
        }
        self.load_profile(source, false).await
    }

    /// Retry the profile fetch, e.g. after a network failure.
    pub async fn refresh(&self, source: &dyn ProfileSource) -> AuthState {
        self.load_profile(source, true).await
    }

    async fn load_profile(&self, source: &dyn ProfileSource, force: bool) -> AuthState {
        let _gate = self.inner.fetch_gate.lock().await;

        let epoch = {
            let mut core = self.write_core();
            if !core.hydrated || !core.has_token {
                return core.auth_state();
            }
            if !force && core.settled_epoch == Some(core.epoch) {
                return core.auth_state();
            }
            core.fetching = true;
            core.last_error = None;
            self.publish(&core);
            core.epoch
        };

        let result = source.fetch_current_user().await;

        let mut core = self.write_core();
        if core.epoch != epoch {
            tracing::debug!(started = epoch, current = core.epoch, "discarding stale profile result");
            return core.auth_state();
        }
        core.fetching = false;
        core.settled_epoch = Some(epoch);
        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "session profile loaded");
                core.cache.set_as(QueryKey::me(), &user);
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("profile fetch unauthorized; clearing session");
                self.invalidate_locked(&mut core);
                let state = core.auth_state();
                drop(core);
                self.emit(SessionEvent::Unauthorized);
                return state;
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile fetch failed; token kept");
                core.last_error = Some(e.to_string());
            }
        }
        self.publish(&core);
        core.auth_state()
    }

    // -------------------------------------------------------------------------
    // transitions
    // -------------------------------------------------------------------------

    /// Apply a successful login: store token, seed the profile, drop every
    /// other cached query.
    pub fn login(&self, response: &LoginResponse) {
        let mut core = self.write_core();
        self.inner.store.set_token(&response.access_token);
        core.hydrated = true;
        core.has_token = self.inner.store.is_authenticated();
        core.fetching = false;
        core.last_error = None;
        core.epoch += 1;
        core.settled_epoch = Some(core.epoch);
        core.cache.set_as(QueryKey::me(), &response.user);
        core.cache.invalidate_all_except(&QueryKey::me());
        self.publish(&core);
        drop(core);

        tracing::info!(user_id = response.user.id, "logged in");
        self.emit(SessionEvent::LoggedIn { user_id: response.user.id });
    }

    /// Explicit logout: clear token and cache, notify every consumer.
    pub fn logout(&self) {
        self.invalidate(SessionEvent::LoggedOut);
        tracing::info!("logged out");
    }

    /// Forced logout after the backend rejected the token.
    pub fn handle_unauthorized(&self) {
        self.invalidate(SessionEvent::Unauthorized);
        tracing::warn!("session cleared after unauthorized response");
    }

    /// Forced logout for a 401 on a request issued at `epoch`.
    ///
    /// Ignored when the session was already reset or replaced by a newer
    /// login since then. Returns whether the session was cleared.
    pub fn handle_unauthorized_since(&self, epoch: u64) -> bool {
        let mut core = self.write_core();
        if core.epoch != epoch {
            tracing::debug!(started = epoch, current = core.epoch, "ignoring 401 from previous session");
            return false;
        }
        self.invalidate_locked(&mut core);
        drop(core);
        self.emit(SessionEvent::Unauthorized);
        tracing::warn!("session cleared after unauthorized response");
        true
    }

    fn invalidate(&self, event: SessionEvent) {
        let mut core = self.write_core();
        self.invalidate_locked(&mut core);
        drop(core);
        self.emit(event);
    }

    fn invalidate_locked(&self, core: &mut SessionCore) {
        self.inner.store.remove_token();
        core.hydrated = true;
        core.has_token = false;
        core.fetching = false;
        core.last_error = None;
        core.epoch += 1;
        core.settled_epoch = None;
        core.cache.clear();
        self.publish(core);
    }

    /// Replace the cached profile after a successful update.
    pub fn profile_updated(&self, user: &User) {
        let mut core = self.write_core();
        if !core.has_token {
            return;
        }
        core.cache.set_as(QueryKey::me(), user);
        core.cache.invalidate_prefix(&QueryKey::profile());
        core.cache.invalidate_prefix(&QueryKey::user_badges(user.id));
        self.publish(&core);
        drop(core);
        self.emit(SessionEvent::ProfileUpdated { user_id: user.id });
    }

    /// Re-read the token store after another process may have changed it.
    ///
    /// A token removed elsewhere logs this session out; a token written
    /// elsewhere marks the session as needing a profile check. Returns true
    /// when a profile fetch is now required.
    pub fn sync_with_store(&self) -> bool {
        let present = self.inner.store.is_authenticated();
        let mut core = self.write_core();
        if !core.hydrated || present == core.has_token {
            return false;
        }
        if present {
            core.has_token = true;
            core.epoch += 1;
            core.settled_epoch = None;
            core.cache.clear();
            self.publish(&core);
            tracing::info!("token appeared in storage; profile check required");
            true
        } else {
            self.invalidate_locked(&mut core);
            drop(core);
            tracing::info!("token removed from storage; session logged out");
            self.emit(SessionEvent::LoggedOut);
            false
        }
    }

    // -------------------------------------------------------------------------
    // query cache
    // -------------------------------------------------------------------------

    /// Invalidation generation; pass back to [`SessionContext::store_query`].
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.core.read().unwrap_or_else(PoisonError::into_inner).epoch
    }

    #[must_use]
    pub fn cached<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        self.inner.core.read().unwrap_or_else(PoisonError::into_inner).cache.get_as(key)
    }

    /// Cache a fetched value unless the session was invalidated since
    /// `epoch` was read. Returns whether the value was stored.
    pub fn store_query<T: Serialize>(&self, epoch: u64, key: QueryKey, value: &T) -> bool {
        let mut core = self.write_core();
        if core.epoch != epoch {
            tracing::debug!(key = ?key.segments(), "skipping cache write from previous session");
            return false;
        }
        core.cache.set_as(key, value);
        true
    }

    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        self.write_core().cache.invalidate_prefix(prefix)
    }
}

// =============================================================================
// CONSUMER HANDLE
// =============================================================================

/// A mounted consumer of the session's auth state.
pub struct AuthHandle {
    state: watch::Receiver<AuthState>,
    events: broadcast::Receiver<SessionEvent>,
}

impl AuthHandle {
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Wait for the next state publication. `None` once the session is gone.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Wait for the next typed event, skipping over lag.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth consumer lagged behind session events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`AuthHandle::next_event`].
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        loop {
            match self.events.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
