//! File-based session repository implementation.
//!
//! The session lives in `session.json` under the user's config directory
//! (`~/.config/lyceum/session.json` on Linux).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lyceum_application::{SessionRepository, SessionStorageError};
use lyceum_domain::Credential;
use serde::{Deserialize, Serialize};
use tokio::fs;

const SCHEMA_VERSION: u32 = 1;

/// On-disk layout:
/// ```json
/// {
///   "schema_version": 1,
///   "credential": {
///     "access_token": "eyJhbGciOi...",
///     "active_tenant_id": "north"
///   }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    schema_version: u32,
    credential: Credential,
}

/// Stores the signed-in credential as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionRepository {
    path: PathBuf,
}

impl FileSessionRepository {
    /// Creates a repository storing the session at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default session location, if the platform has a config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lyceum").join("session.json"))
    }

    /// Where the session is stored.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionRepository for FileSessionRepository {
    async fn load(&self) -> Result<Option<Credential>, SessionStorageError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file: SessionFile = serde_json::from_slice(&content)
            .map_err(|e| SessionStorageError::Serialization(e.to_string()))?;

        if file.schema_version != SCHEMA_VERSION {
            return Err(SessionStorageError::Serialization(format!(
                "unsupported session schema version {}",
                file.schema_version
            )));
        }

        Ok(Some(file.credential))
    }

    async fn save(&self, credential: &Credential) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = SessionFile {
            schema_version: SCHEMA_VERSION,
            credential: credential.clone(),
        };
        let mut content = serde_json::to_vec_pretty(&file)
            .map_err(|e| SessionStorageError::Serialization(e.to_string()))?;
        content.push(b'\n');

        fs::write(&self.path, content).await?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
