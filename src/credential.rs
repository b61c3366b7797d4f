//! Provider credential lifecycle.
//!
//! The credential moves through `Unknown -> Checking -> {HasCredential, NeedsCredential}`.
//! `HasCredential` only falls back to `NeedsCredential` through [`CredentialManager::invalidate`],
//! which also notifies every subscriber exactly once per revocation.

use crate::{
    config::{non_empty_env, CredentialConfig},
    error::{InfogenError, Result},
};
use async_trait::async_trait;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// An API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into().trim().to_string();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(****{} chars)", self.0.len())
    }
}

/// Where the active credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    Environment,
    Stored,
    HostSelection,
    UserEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Unknown,
    Checking,
    HasCredential {
        credential: Credential,
        origin: CredentialOrigin,
    },
    NeedsCredential,
}

impl CredentialState {
    pub fn is_ready(&self) -> bool {
        matches!(self, CredentialState::HasCredential { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    /// The provider rejected the credential; a new one must be entered or selected.
    Invalidated,
}

/// Persistence for a user-entered credential.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>>;
    fn save(&self, credential: &Credential) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Host-provided selection flow, consulted after the environment and the store.
#[async_trait]
pub trait CredentialSelector: Send + Sync {
    async fn select(&self) -> Result<Option<Credential>>;
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Writes `contents` readable by the owner only. An existing file is narrowed too.
#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(path, contents)
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Credential::new(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        write_private(&self.path, credential.expose())?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            value: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.lock()? = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

impl MemoryCredentialStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Credential>>> {
        self.value
            .lock()
            .map_err(|_| InfogenError::Config("credential store lock poisoned".into()))
    }
}

pub struct CredentialManager {
    env_vars: Vec<String>,
    store: Arc<dyn CredentialStore>,
    selector: Option<Arc<dyn CredentialSelector>>,
    state: Mutex<CredentialState>,
    events: broadcast::Sender<CredentialEvent>,
}

impl CredentialManager {
    pub fn new(config: &CredentialConfig, store: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            env_vars: config.env_vars.clone(),
            store,
            selector: None,
            state: Mutex::new(CredentialState::Unknown),
            events,
        }
    }

    pub fn from_config(config: &CredentialConfig) -> Self {
        Self::new(
            config,
            Arc::new(FileCredentialStore::new(config.store_path.clone())),
        )
    }

    /// Starts directly in `HasCredential`; useful for embedding and tests.
    pub fn with_credential(credential: Credential) -> Self {
        let manager = Self::new(
            &CredentialConfig::default().with_env_vars(Vec::new()),
            Arc::new(MemoryCredentialStore::new()),
        );
        manager.set_state(CredentialState::HasCredential {
            credential,
            origin: CredentialOrigin::UserEntry,
        });
        manager
    }

    pub fn with_selector(mut self, selector: Arc<dyn CredentialSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn state(&self) -> CredentialState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_state(&self, next: CredentialState) {
        match self.state.lock() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CredentialEvent> {
        self.events.subscribe()
    }

    /// Runs the first resolution (environment, store, host selection). Later calls
    /// return the current state unchanged.
    pub async fn resolve(&self) -> CredentialState {
        {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            if *state != CredentialState::Unknown {
                return state.clone();
            }
            *state = CredentialState::Checking;
        }

        let resolved = self.lookup().await;
        let next = match resolved {
            Some((credential, origin)) => {
                log::info!("🔑 Provider credential resolved from {:?}", origin);
                CredentialState::HasCredential { credential, origin }
            }
            None => {
                log::warn!("⚠️  No provider credential available");
                CredentialState::NeedsCredential
            }
        };
        self.set_state(next.clone());
        next
    }

    async fn lookup(&self) -> Option<(Credential, CredentialOrigin)> {
        for name in &self.env_vars {
            if let Some(credential) = non_empty_env(name).and_then(Credential::new) {
                return Some((credential, CredentialOrigin::Environment));
            }
        }

        match self.store.load() {
            Ok(Some(credential)) => return Some((credential, CredentialOrigin::Stored)),
            Ok(None) => {}
            Err(e) => log::warn!("⚠️  Could not read stored credential: {}", e),
        }

        self.select_from_host().await
    }

    async fn select_from_host(&self) -> Option<(Credential, CredentialOrigin)> {
        let selector = self.selector.as_ref()?;
        match selector.select().await {
            Ok(Some(credential)) => Some((credential, CredentialOrigin::HostSelection)),
            Ok(None) => None,
            Err(e) => {
                log::warn!("⚠️  Credential selection failed: {}", e);
                None
            }
        }
    }

    /// The active credential, or `CredentialMissing` when generation must be blocked.
    pub fn current(&self) -> Result<Credential> {
        match self.state() {
            CredentialState::HasCredential { credential, .. } => Ok(credential),
            _ => Err(InfogenError::CredentialMissing),
        }
    }

    /// Stores a user-entered credential and makes it active.
    pub fn provide(&self, raw: &str) -> Result<()> {
        let credential = Credential::new(raw)
            .ok_or_else(|| InfogenError::InvalidInput("credential is empty".into()))?;
        self.store.save(&credential)?;
        self.set_state(CredentialState::HasCredential {
            credential,
            origin: CredentialOrigin::UserEntry,
        });
        Ok(())
    }

    /// Re-runs the host selection flow after an invalidation.
    pub async fn reselect(&self) -> CredentialState {
        if let Some((credential, origin)) = self.select_from_host().await {
            self.set_state(CredentialState::HasCredential { credential, origin });
        }
        self.state()
    }

    /// Revokes the active credential. Returns true and notifies subscribers only on
    /// the `HasCredential -> NeedsCredential` transition.
    pub fn invalidate(&self) -> bool {
        self.revoke(|_| true)
    }

    /// Revokes the active credential only if it is `rejected`. A late failure of a
    /// request that ran with an older key leaves a newer key untouched.
    pub fn invalidate_if(&self, rejected: &Credential) -> bool {
        self.revoke(|active| active == rejected)
    }

    fn revoke(&self, matches: impl Fn(&Credential) -> bool) -> bool {
        let revoked = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            match &*state {
                CredentialState::HasCredential { credential, .. } if matches(credential) => {
                    *state = CredentialState::NeedsCredential;
                    true
                }
                _ => false,
            }
        };

        if revoked {
            log::warn!("🔒 Provider rejected the credential; re-entry required");
            if let Err(e) = self.store.clear() {
                log::warn!("⚠️  Could not clear stored credential: {}", e);
            }
            // No subscribers is fine.
            let _ = self.events.send(CredentialEvent::Invalidated);
        }
        revoked
    }
}
