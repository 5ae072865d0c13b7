use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, SameSite};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use time::Duration;
use tokio::sync::RwLock;

use crate::error::SessionError;

// 1. Key-value slot (client-held persistence)

/// KeyValueStorage
///
/// A string key-value slot that survives between page loads on the client.
/// The portal only ever touches one key in it (the session token), but the
/// contract stays generic so other client state can share the slot.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError>;
    async fn remove_item(&self, key: &str) -> Result<(), SessionError>;
}

/// MemoryStorage
///
/// Process-local slot. Used by tests and whenever no storage file is configured.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

/// FileStorage
///
/// Durable slot persisted as a flat JSON object. Every mutation rewrites the
/// whole file under a lock, so concurrent writers in one process never interleave.
#[derive(Clone)]
pub struct FileStorage {
    path: PathBuf,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, items: &HashMap<String, String>) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec(items)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        if items.remove(key).is_some() {
            self.write_all(&items).await?;
        }
        Ok(())
    }
}

// 2. Session token repositories

/// SessionTokenRepository
///
/// Durable storage of one copy of the session credential. No logic lives here:
/// validation is the session manager's job, presence checks are the guard's.
#[async_trait]
pub trait SessionTokenRepository: Send + Sync {
    async fn load(&self) -> Result<Option<String>, SessionError>;
    async fn save(&self, token: &str) -> Result<(), SessionError>;
    async fn clear(&self) -> Result<(), SessionError>;
}

/// TokenRepositoryState
///
/// Shared handle to either copy of the credential.
pub type TokenRepositoryState = Arc<dyn SessionTokenRepository>;

/// ClientTokenRepository
///
/// The copy in-page code reads to build the `Authorization` header.
#[derive(Clone)]
pub struct ClientTokenRepository {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl ClientTokenRepository {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SessionTokenRepository for ClientTokenRepository {
    async fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .storage
            .get_item(&self.key)
            .await?
            .filter(|token| !token.trim().is_empty()))
    }

    async fn save(&self, token: &str) -> Result<(), SessionError> {
        self.storage.set_item(&self.key, token).await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.storage.remove_item(&self.key).await
    }
}

/// CookieTokenRepository
///
/// The copy the browser sends with every navigation, i.e. the one the edge
/// guard sees. The cookie value lives in a durable jar so it survives page
/// loads exactly as long as the client copy does. Writes also produce the
/// `Set-Cookie` value; reads produce a `Cookie` request header value.
#[derive(Clone)]
pub struct CookieTokenRepository {
    name: String,
    secure: bool,
    jar: Arc<dyn KeyValueStorage>,
    last_set_cookie: Arc<Mutex<Option<String>>>,
}

impl CookieTokenRepository {
    /// Cookie copy kept in a process-local jar.
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self::with_jar(name, secure, Arc::new(MemoryStorage::new()))
    }

    /// Cookie copy persisted in `jar` under `cookie.<name>`.
    pub fn with_jar(name: impl Into<String>, secure: bool, jar: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            name: name.into(),
            secure,
            jar,
            last_set_cookie: Arc::new(Mutex::new(None)),
        }
    }

    /// Value for a `Cookie` request header, or `None` when no credential is held.
    pub async fn cookie_header(&self) -> Option<String> {
        match self.load().await {
            Ok(token) => token.map(|token| format!("{}={}", self.name, token)),
            Err(e) => {
                tracing::warn!(error = %e, "session cookie unreadable");
                None
            }
        }
    }

    /// The `Set-Cookie` value produced by the most recent save or clear.
    pub fn last_set_cookie(&self) -> Option<String> {
        self.last_set_cookie.lock().ok()?.clone()
    }

    fn jar_key(&self) -> String {
        format!("cookie.{}", self.name)
    }

    fn build(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    fn record(&self, cookie: &Cookie<'static>) {
        if let Ok(mut last) = self.last_set_cookie.lock() {
            *last = Some(cookie.to_string());
        }
    }
}

#[async_trait]
impl SessionTokenRepository for CookieTokenRepository {
    async fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .jar
            .get_item(&self.jar_key())
            .await?
            .filter(|token| !token.trim().is_empty()))
    }

    async fn save(&self, token: &str) -> Result<(), SessionError> {
        let cookie = self.build(token.to_string());
        self.jar.set_item(&self.jar_key(), cookie.value()).await?;
        self.record(&cookie);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let mut removal = self.build(String::new());
        removal.set_max_age(Duration::ZERO);
        self.jar.remove_item(&self.jar_key()).await?;
        self.record(&removal);
        Ok(())
    }
}

// 3. Facade over both copies

/// CredentialStore
///
/// Every write path (login, logout, invalidation) goes through here so the
/// cookie the guard reads and the token the session manager reads never
/// diverge. Reads stay per-copy: each enforcement point reads only the copy
/// it can actually see.
#[derive(Clone)]
pub struct CredentialStore {
    cookie: TokenRepositoryState,
    client: TokenRepositoryState,
}

impl CredentialStore {
    pub fn new(cookie: TokenRepositoryState, client: TokenRepositoryState) -> Self {
        Self { cookie, client }
    }

    /// In-memory store pair, as used by tests and one-shot tools.
    pub fn in_memory(cookie_name: &str) -> (Self, CookieTokenRepository, MemoryStorage) {
        let cookie = CookieTokenRepository::new(cookie_name, false);
        let storage = MemoryStorage::new();
        let client = ClientTokenRepository::new(Arc::new(storage.clone()), cookie_name);
        let store = Self::new(Arc::new(cookie.clone()), Arc::new(client));
        (store, cookie, storage)
    }

    pub async fn client_token(&self) -> Result<Option<String>, SessionError> {
        self.client.load().await
    }

    pub async fn cookie_token(&self) -> Result<Option<String>, SessionError> {
        self.cookie.load().await
    }

    /// store
    ///
    /// Writes the credential to both copies. If the second write fails the
    /// first is rolled back, so a half-written session never survives.
    pub async fn store(&self, token: &str) -> Result<(), SessionError> {
        self.cookie.save(token).await?;
        if let Err(e) = self.client.save(token).await {
            if let Err(rollback) = self.cookie.clear().await {
                tracing::error!(error = %rollback, "failed to roll back session cookie");
            }
            return Err(e);
        }
        Ok(())
    }

    /// clear
    ///
    /// Erases both copies. Both are attempted even if the first fails; the
    /// first error is reported.
    pub async fn clear(&self) -> Result<(), SessionError> {
        let cookie = self.cookie.clear().await;
        let client = self.client.clear().await;
        cookie.and(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRepository;

    #[async_trait]
    impl SessionTokenRepository for FailingRepository {
        async fn load(&self) -> Result<Option<String>, SessionError> {
            Err(SessionError::Storage("unavailable".to_string()))
        }
        async fn save(&self, _token: &str) -> Result<(), SessionError> {
            Err(SessionError::Storage("unavailable".to_string()))
        }
        async fn clear(&self) -> Result<(), SessionError> {
            Err(SessionError::Storage("unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn store_writes_both_copies() {
        let (store, cookie, _) = CredentialStore::in_memory("token");
        store.store("tok1").await.unwrap();

        assert_eq!(store.client_token().await.unwrap().as_deref(), Some("tok1"));
        assert_eq!(store.cookie_token().await.unwrap().as_deref(), Some("tok1"));
        assert_eq!(cookie.cookie_header().await.as_deref(), Some("token=tok1"));
    }

    #[tokio::test]
    async fn clear_erases_both_copies() {
        let (store, cookie, storage) = CredentialStore::in_memory("token");
        store.store("tok1").await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.client_token().await.unwrap(), None);
        assert_eq!(cookie.cookie_header().await, None);
        assert_eq!(storage.get_item("token").await.unwrap(), None);
        assert!(cookie.last_set_cookie().unwrap().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn failed_client_write_rolls_back_cookie() {
        let cookie = CookieTokenRepository::new("token", false);
        let store = CredentialStore::new(Arc::new(cookie.clone()), Arc::new(FailingRepository));

        assert!(store.store("tok1").await.is_err());
        assert_eq!(cookie.cookie_header().await, None);
    }

    #[tokio::test]
    async fn clear_attempts_both_copies_when_one_fails() {
        let storage = MemoryStorage::new();
        storage.set_item("token", "tok1").await.unwrap();
        let client = ClientTokenRepository::new(Arc::new(storage.clone()), "token");
        let store = CredentialStore::new(Arc::new(FailingRepository), Arc::new(client));

        assert!(store.clear().await.is_err());
        assert_eq!(storage.get_item("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn session_cookie_attributes() {
        let cookie = CookieTokenRepository::new("token", true);
        cookie.save("abc").await.unwrap();
        let set_cookie = cookie.last_set_cookie().unwrap();

        assert!(set_cookie.starts_with("token=abc"));
        assert!(set_cookie.contains("Path=/"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn cookie_jar_outlives_the_repository() {
        let jar = MemoryStorage::new();
        CookieTokenRepository::with_jar("token", false, Arc::new(jar.clone()))
            .save("xyz")
            .await
            .unwrap();

        let reopened = CookieTokenRepository::with_jar("token", false, Arc::new(jar.clone()));
        assert_eq!(reopened.cookie_header().await.as_deref(), Some("token=xyz"));
        assert_eq!(jar.get_item("cookie.token").await.unwrap().as_deref(), Some("xyz"));
    }

    #[tokio::test]
    async fn blank_client_token_reads_as_absent() {
        let storage = MemoryStorage::new();
        let client = ClientTokenRepository::new(Arc::new(storage.clone()), "token");
        for blank in ["", "   ", "\t"] {
            storage.set_item("token", blank).await.unwrap();
            assert_eq!(client.load().await.unwrap(), None, "{blank:?}");
        }
    }

    #[tokio::test]
    async fn file_storage_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");

        FileStorage::new(&path).set_item("token", "tok1").await.unwrap();
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("token").await.unwrap().as_deref(), Some("tok1"));

        reopened.remove_item("token").await.unwrap();
        assert_eq!(FileStorage::new(&path).get_item("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert_eq!(storage.get_item("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_storage_corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        std::fs::write(&path, b"not json").unwrap();

        let err = FileStorage::new(&path).get_item("token").await.unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
    }
}
