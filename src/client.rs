use std::sync::Arc;

use crate::{
    backend::{BackendState, HttpAuthBackend},
    config::AppConfig,
    forms::AuthFlow,
    navigation::NavigatorState,
    session::SessionManager,
    storage::{
        ClientTokenRepository, CookieTokenRepository, CredentialStore, FileStorage,
        KeyValueStorage, MemoryStorage,
    },
};

/// ClientContext
///
/// Everything a rendered page needs for session handling, wired to one
/// credential facade so the session manager and the auth forms can never
/// write different stores. Both credential copies live in the same storage,
/// so a reload restores either both or neither.
#[derive(Clone)]
pub struct ClientContext {
    pub cookie: CookieTokenRepository,
    pub store: CredentialStore,
    pub session: SessionManager,
    pub auth: AuthFlow,
}

impl ClientContext {
    /// from_config
    ///
    /// HTTP backend at `api_base_url`; the client slot is file-backed when
    /// `client_storage_path` is set and in-memory otherwise.
    pub fn from_config(config: &AppConfig, navigator: NavigatorState) -> Self {
        let storage: Arc<dyn KeyValueStorage> = match &config.client_storage_path {
            Some(path) => Arc::new(FileStorage::new(path)),
            None => Arc::new(MemoryStorage::new()),
        };
        let backend: BackendState = Arc::new(HttpAuthBackend::new(&config.api_base_url));
        Self::assemble(config, storage, backend, navigator)
    }

    /// Same wiring with caller-supplied storage and backend. The cookie jar
    /// entry is kept next to the client token in `storage`.
    pub fn assemble(
        config: &AppConfig,
        storage: Arc<dyn KeyValueStorage>,
        backend: BackendState,
        navigator: NavigatorState,
    ) -> Self {
        let cookie = CookieTokenRepository::with_jar(
            &config.cookie_name,
            config.cookie_secure,
            storage.clone(),
        );
        let client = ClientTokenRepository::new(storage, &config.cookie_name);
        let store = CredentialStore::new(Arc::new(cookie.clone()), Arc::new(client));

        let session = SessionManager::new(
            store.clone(),
            backend.clone(),
            navigator.clone(),
            &config.login_route,
        );
        let auth = AuthFlow::new(
            backend,
            store.clone(),
            navigator,
            &config.login_route,
            &config.landing_route,
        );

        Self {
            cookie,
            store,
            session,
            auth,
        }
    }
}
