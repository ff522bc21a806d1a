//! Session repository port
//!
//! Lets a signed-in session survive a restart of the console.

use async_trait::async_trait;

use lyceum_domain::Credential;

/// Errors that can occur while saving or loading a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionStorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Repository trait for session persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Loads the saved credential.
    ///
    /// # Returns
    /// `None` if no session has been saved.
    async fn load(&self) -> Result<Option<Credential>, SessionStorageError>;

    /// Saves the credential, replacing any previous session.
    async fn save(&self, credential: &Credential) -> Result<(), SessionStorageError>;

    /// Removes the saved session. Removing a missing session is not an error.
    async fn clear(&self) -> Result<(), SessionStorageError>;
}
