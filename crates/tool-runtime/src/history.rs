//! Conversation history repositories, scoped per conversation id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use crate::message::Message;

/// Identifies one conversation history.
///
/// Restricted to ASCII alphanumerics, `-` and `_` so it can name a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Result<Self, HistoryError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(id))
        } else {
            Err(HistoryError::InvalidId(id))
        }
    }

    /// A fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only message store for conversations.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Full history of a conversation; empty if it has never been written.
    async fn load(&self, conversation: &ConversationId) -> Result<Vec<Message>, HistoryError>;

    /// Append messages to the end of a conversation, creating it if absent.
    async fn append(
        &self,
        conversation: &ConversationId,
        messages: &[Message],
    ) -> Result<(), HistoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Invalid conversation id: {0:?}")]
    InvalidId(String),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt history file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Process-local history, lost on exit.
#[derive(Default)]
pub struct InMemoryHistory {
    conversations: RwLock<HashMap<ConversationId, Vec<Message>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn load(&self, conversation: &ConversationId) -> Result<Vec<Message>, HistoryError> {
        Ok(self
            .conversations
            .read()
            .await
            .get(conversation)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(
        &self,
        conversation: &ConversationId,
        messages: &[Message],
    ) -> Result<(), HistoryError> {
        self.conversations
            .write()
            .await
            .entry(conversation.clone())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }
}

/// On-disk layout of one conversation file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    messages: Vec<Message>,
}

/// One pretty-printed JSON file per conversation under a directory.
/// Each append reads the whole file and rewrites it.
pub struct JsonFileHistory {
    dir: PathBuf,
}

impl JsonFileHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, conversation: &ConversationId) -> PathBuf {
        self.dir.join(format!("{}.json", conversation.as_str()))
    }

    async fn read_file(&self, path: &Path) -> Result<HistoryFile, HistoryError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|source| HistoryError::Corrupt {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HistoryFile::default()),
            Err(source) => Err(HistoryError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistory {
    async fn load(&self, conversation: &ConversationId) -> Result<Vec<Message>, HistoryError> {
        let path = self.file_path(conversation);
        Ok(self.read_file(&path).await?.messages)
    }

    async fn append(
        &self,
        conversation: &ConversationId,
        messages: &[Message],
    ) -> Result<(), HistoryError> {
        let path = self.file_path(conversation);
        let mut file = self.read_file(&path).await?;
        file.messages.extend_from_slice(messages);

        let io_err = |source| HistoryError::Io {
            path: path.clone(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let json = serde_json::to_string_pretty(&file)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        debug!(
            conversation = %conversation,
            path = %path.display(),
            total = file.messages.len(),
            "History saved"
        );
        Ok(())
    }
}
