use std::{path::PathBuf, sync::Mutex};

use async_trait::async_trait;

use crate::{config, error::Result, types::AuthorizationState};

/// Durable key-value storage for the four authorization fields.
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Returns the stored state, or an empty one if nothing was saved yet.
    async fn load(&self) -> Result<AuthorizationState>;
    async fn save(&self, state: &AuthorizationState) -> Result<()>;
    /// Removes every field. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;
}

/// JSON file in the local data directory, next to the `.env` file.
pub struct FileAuthorizationStore {
    path: PathBuf,
}

impl FileAuthorizationStore {
    /// Store backed by the JSON file at `path`.
    ///
    /// Neither the file nor its parent directory has to exist yet; both are
    /// created on the first [`save`](AuthorizationStore::save). The
    /// [`Default`] store lives at `<data dir>/cache/authorization.json`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Sibling file a save is staged in before it replaces `path`.
    pub fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> PathBuf {
        let mut path = config::data_dir();
        path.push("cache/authorization.json");
        path
    }
}

impl Default for FileAuthorizationStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

#[async_trait]
impl AuthorizationStore for FileAuthorizationStore {
    async fn load(&self) -> Result<AuthorizationState> {
        let json = match async_fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AuthorizationState::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    async fn save(&self, state: &AuthorizationState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        // written next to the target and renamed over it, so readers only
        // ever see a complete file
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.tmp_path();
        async_fs::write(&tmp, json).await?;
        if let Err(e) = async_fs::rename(&tmp, &self.path).await {
            let _ = async_fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, handy for embedding and for tests.
#[derive(Default)]
pub struct MemoryAuthorizationStore {
    state: Mutex<AuthorizationState>,
}

impl MemoryAuthorizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AuthorizationState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> AuthorizationState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AuthorizationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AuthorizationStore for MemoryAuthorizationStore {
    async fn load(&self) -> Result<AuthorizationState> {
        Ok(self.snapshot())
    }

    async fn save(&self, state: &AuthorizationState) -> Result<()> {
        *self.lock() = state.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.lock() = AuthorizationState::default();
        Ok(())
    }
}

#[async_trait]
impl<S: AuthorizationStore + ?Sized> AuthorizationStore for std::sync::Arc<S> {
    async fn load(&self) -> Result<AuthorizationState> {
        (**self).load().await
    }

    async fn save(&self, state: &AuthorizationState) -> Result<()> {
        (**self).save(state).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }
}
