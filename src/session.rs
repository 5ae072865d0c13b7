//! Client session manager.
//!
//! Owns the client-visible session (`{ user, loading }`) for one rendered page.
//! On mount it validates the client-held token against the identity endpoint
//! and reconciles the credential stores with the answer. It is a plain value
//! handed to whatever renders the page, never a process-wide singleton.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::{Mutex, watch};

use crate::{
    backend::BackendState,
    error::SessionError,
    models::UserProfile,
    navigation::NavigatorState,
    storage::CredentialStore,
};

/// SessionState
///
/// Derived, never persisted. `loading` is true until the first check completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub loading: bool,
}

impl SessionState {
    /// State of a page that has not finished its identity check yet.
    pub fn initial() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    fn resolved(user: Option<UserProfile>) -> Self {
        Self {
            user,
            loading: false,
        }
    }

    /// Protected content may only be rendered for a resolved user.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// SessionManager
///
/// Cheap to clone; clones share the same state and the same in-flight guard.
/// `generation` moves on every logout; a check started before a logout never
/// publishes its result.
#[derive(Clone)]
pub struct SessionManager {
    store: CredentialStore,
    backend: BackendState,
    navigator: NavigatorState,
    login_route: String,
    state: Arc<watch::Sender<SessionState>>,
    in_flight: Arc<Mutex<()>>,
    generation: Arc<AtomicU64>,
}

impl SessionManager {
    pub fn new(
        store: CredentialStore,
        backend: BackendState,
        navigator: NavigatorState,
        login_route: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self {
            store,
            backend,
            navigator,
            login_route: login_route.into(),
            state: Arc::new(state),
            in_flight: Arc::new(Mutex::new(())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current `{ user, loading }`.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change, for renderers that wait on `loading`.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// mount
    ///
    /// Runs the identity check for a freshly rendered page. Re-mounting (for
    /// example when a protected layout is entered again) runs it again; calls
    /// on the same manager are serialised, so only one check is ever in flight.
    ///
    /// - no client token: `user = None`, no network call.
    /// - 2xx: `user` comes from the response.
    /// - rejected token: both credential copies are erased, `user = None`,
    ///   and the page navigates to the login route.
    /// - backend unreachable: `user = None`, the token is kept, no navigation.
    ///
    /// A `logout` that lands while the check is running wins: the result is
    /// dropped and the signed-out state stays.
    pub async fn mount(&self) -> SessionState {
        let _in_flight = self.in_flight.lock().await;
        let generation = self.generation.load(Ordering::SeqCst);
        self.state.send_modify(|state| state.loading = true);

        let token = match self.store.client_token().await {
            Ok(Some(token)) => token,
            Ok(None) => return self.resolve(generation, None),
            Err(e) => {
                tracing::warn!(error = %e, "client token unreadable, treating session as missing");
                return self.resolve(generation, None);
            }
        };

        match self.backend.current_user(&token).await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "session resolved");
                self.resolve(generation, Some(user))
            }
            Err(e @ SessionError::InvalidCredential { .. }) => {
                if self.is_superseded(generation) {
                    return self.snapshot();
                }
                tracing::info!(error = %e, "session credential rejected, signing out");
                self.erase_credentials().await;
                let state = self.resolve(generation, None);
                self.navigator.navigate(&self.login_route);
                state
            }
            Err(e) => {
                // Keep the token: a network blip must not destroy a possibly valid session.
                tracing::warn!(error = %e, "identity check failed, keeping stored credential");
                self.resolve(generation, None)
            }
        }
    }

    /// Re-runs the identity check on demand.
    pub async fn refresh(&self) -> SessionState {
        self.mount().await
    }

    /// logout
    ///
    /// Drops the user, erases both credential copies and navigates to login.
    /// Safe to call without an active session. Any identity check still in
    /// flight is discarded when it completes.
    pub async fn logout(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SessionState::resolved(None));
        self.erase_credentials().await;
        self.navigator.navigate(&self.login_route);
    }

    async fn erase_credentials(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::error!(error = %e, "failed to erase session credentials");
        }
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    /// Publishes the outcome of the check started at `generation`, unless a
    /// logout happened since. The comparison runs under the channel's lock, so
    /// a concurrent logout either sees this state and overwrites it or causes
    /// it to be dropped.
    fn resolve(&self, generation: u64, user: Option<UserProfile>) -> SessionState {
        self.state.send_if_modified(|state| {
            if self.is_superseded(generation) {
                tracing::debug!("identity check outlived a logout, result dropped");
                return false;
            }
            *state = SessionState::resolved(user);
            true
        });
        self.snapshot()
    }
}
