//! JSON document store for experiment history.
//!
//! The whole document is read on every access and rewritten on every write.
//! Writers go through [`ExperimentStore::writer`], which serialises the
//! read-latest / append / persist sequence within the process.

use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::model::{Experiment, ExperimentSet, ResultsDocument};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt results file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct ExperimentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ExperimentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole document; a missing file reads as an empty one.
    pub async fn load(&self) -> Result<ResultsDocument, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResultsDocument::default()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub async fn load_experiment(&self, name: &str) -> Result<Option<Experiment>, StoreError> {
        Ok(self.load().await?.experiment(name).cloned())
    }

    /// Exclusive write access until the returned guard is dropped.
    pub async fn writer(&self) -> StoreWriter<'_> {
        StoreWriter {
            store: self,
            _guard: self.write_lock.lock().await,
        }
    }

    async fn persist(&self, doc: &ResultsDocument) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

/// Holds the store's write lock.
pub struct StoreWriter<'a> {
    store: &'a ExperimentStore,
    _guard: MutexGuard<'a, ()>,
}

impl StoreWriter<'_> {
    pub async fn load_experiment(&self, name: &str) -> Result<Option<Experiment>, StoreError> {
        self.store.load_experiment(name).await
    }

    /// Append `set` to experiment `name` (created if absent) and rewrite the file.
    pub async fn append_set(&self, name: &str, set: ExperimentSet) -> Result<(), StoreError> {
        let mut doc = self.store.load().await?;
        doc.append_set(name, set);
        self.store.persist(&doc).await?;
        debug!(
            experiment = name,
            path = %self.store.path.display(),
            experiments = doc.experiments.len(),
            "Results saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Run, Score};
    use chrono::Utc;
    use serde_json::json;

    fn set(score: f64) -> ExperimentSet {
        ExperimentSet::new(
            vec![Run {
                input: json!("q"),
                output: json!("a"),
                expected: Some(json!("a")),
                scores: vec![Score {
                    name: "ExactMatch".into(),
                    score,
                }],
                created_at: Utc::now(),
            }],
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = ExperimentStore::new(dir.path().join("results.json"));
        assert_eq!(store.load().await.unwrap(), ResultsDocument::default());
        assert!(store.load_experiment("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_persists_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");
        let store = ExperimentStore::new(&path);
        {
            let writer = store.writer().await;
            writer.append_set("exp", set(0.0)).await.unwrap();
            writer.append_set("exp", set(1.0)).await.unwrap();
        }

        let reopened = ExperimentStore::new(&path);
        let exp = reopened.load_experiment("exp").await.unwrap().unwrap();
        assert_eq!(exp.sets.len(), 2);
        assert_eq!(exp.sets[0].score, 0.0);
        assert_eq!(exp.latest_score(), Some(1.0));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let store = ExperimentStore::new(&path);
        store.writer().await.append_set("exp", set(1.0)).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let set = &raw["experiments"][0]["sets"][0];
        assert_eq!(raw["experiments"][0]["name"], "exp");
        assert_eq!(set["score"], 1.0);
        assert!(set["createdAt"].is_string());
        assert!(set["runs"][0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, "not json").unwrap();
        let store = ExperimentStore::new(&path);
        assert!(matches!(
            store.load().await.unwrap_err(),
            StoreError::Corrupt { .. }
        ));
    }
}
