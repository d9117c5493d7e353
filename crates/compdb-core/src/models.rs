//! Batch download of model repositories from the Hugging Face hub
//!
//! Each model in a catalog is fetched independently. A failing model is
//! logged and counted; the batch always moves on to the next one.

use hf_hub::api::sync::{Api, ApiBuilder, ApiError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Hub request failed: {0}")]
    Hub(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read model catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("Model index {index} out of range (catalog has {len} models)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One model to download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    /// Hub repository id, e.g. `org/model-name`
    pub id: String,
    /// Destination directory, relative to the batch base directory
    pub target_dir: PathBuf,
    #[serde(default)]
    pub description: String,
}

impl ModelSpec {
    pub fn new(
        id: impl Into<String>,
        target_dir: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            target_dir: target_dir.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    pub models: Vec<ModelSpec>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelSpec>) -> Self {
        Self { models }
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog: ModelCatalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    /// Models picked by `selection`, in catalog order
    pub fn select(&self, selection: Selection) -> Result<Vec<&ModelSpec>, BatchError> {
        match selection {
            Selection::All => Ok(self.models.iter().collect()),
            Selection::Index(index) => self
                .models
                .get(index)
                .map(|spec| vec![spec])
                .ok_or(BatchError::IndexOutOfRange {
                    index,
                    len: self.models.len(),
                }),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Which catalog entries to download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Index(usize),
}

/// Downloads one model into a local directory
pub trait ModelFetcher {
    fn fetch(&self, spec: &ModelSpec, dest: &Path) -> Result<(), FetchError>;
}

/// Fetcher backed by the hub's blocking client
///
/// Files land in the hub cache first and are then hard-linked (or copied,
/// across filesystems) into the destination tree.
pub struct HubFetcher {
    api: Api,
}

impl HubFetcher {
    pub fn new(token: Option<String>) -> Result<Self, FetchError> {
        let api = ApiBuilder::new().with_token(token).build()?;
        Ok(Self { api })
    }
}

impl ModelFetcher for HubFetcher {
    fn fetch(&self, spec: &ModelSpec, dest: &Path) -> Result<(), FetchError> {
        std::fs::create_dir_all(dest)?;

        let repo = self.api.model(spec.id.clone());
        let info = repo.info()?;
        if info.siblings.is_empty() {
            return Err(FetchError::Rejected(format!(
                "Repository {} has no files",
                spec.id
            )));
        }

        for sibling in info.siblings {
            let remote = sibling.rfilename;
            let cached = repo.get(&remote)?;

            let local = dest.join(&remote);
            if let Some(parent) = local.parent() {
                std::fs::create_dir_all(parent)?;
            }
            if local.exists() {
                debug!("{} already present", local.display());
                continue;
            }
            if std::fs::hard_link(&cached, &local).is_err() {
                std::fs::copy(&cached, &local)?;
            }
            debug!("Fetched {}", remote);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedModel {
    pub id: String,
    pub message: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedModel>,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        format!(
            "Downloaded {}/{} models successfully",
            self.succeeded.len(),
            self.attempted
        )
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs a catalog through a fetcher
pub struct BatchRunner<F: ModelFetcher> {
    catalog: ModelCatalog,
    base_dir: PathBuf,
    fetcher: F,
}

impl<F: ModelFetcher> BatchRunner<F> {
    pub fn new(catalog: ModelCatalog, base_dir: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            catalog,
            base_dir: base_dir.into(),
            fetcher,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn destination(&self, spec: &ModelSpec) -> PathBuf {
        self.base_dir.join(&spec.target_dir)
    }

    /// Download the selected models
    ///
    /// Only an invalid selection is an error; download failures are
    /// recorded in the report.
    pub fn run(&self, selection: Selection) -> Result<BatchReport, BatchError> {
        let selected = self.catalog.select(selection)?;

        let mut report = BatchReport {
            attempted: selected.len(),
            ..BatchReport::default()
        };

        for (position, spec) in selected.into_iter().enumerate() {
            let dest = self.destination(spec);
            info!(
                "[{}/{}] {} ({}) -> {}",
                position + 1,
                report.attempted,
                spec.id,
                spec.description,
                dest.display()
            );

            match self.fetcher.fetch(spec, &dest) {
                Ok(()) => {
                    info!("Downloaded {}", spec.id);
                    report.succeeded.push(spec.id.clone());
                }
                Err(e) => {
                    error!("Failed to download {}: {}", spec.id, e);
                    report.failed.push(FailedModel {
                        id: spec.id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!("{}", report.summary());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every attempt and fails the ids it was told to fail
    struct ScriptedFetcher {
        failing: Vec<String>,
        attempts: RefCell<Vec<(String, PathBuf)>>,
    }

    impl ScriptedFetcher {
        fn failing(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|s| s.to_string()).collect(),
                attempts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModelFetcher for ScriptedFetcher {
        fn fetch(&self, spec: &ModelSpec, dest: &Path) -> Result<(), FetchError> {
            self.attempts
                .borrow_mut()
                .push((spec.id.clone(), dest.to_path_buf()));
            if self.failing.contains(&spec.id) {
                Err(FetchError::Rejected(format!("{} not found", spec.id)))
            } else {
                Ok(())
            }
        }
    }

    fn catalog() -> ModelCatalog {
        ModelCatalog::new(vec![
            ModelSpec::new("org/embedder", "embed", "Sentence embeddings"),
            ModelSpec::new("org/missing", "missing", "Does not exist"),
            ModelSpec::new("org/reranker", "rerank", "Cross-encoder reranker"),
        ])
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let fetcher = ScriptedFetcher::failing(&["org/missing"]);
        let runner = BatchRunner::new(catalog(), "/models", fetcher);

        let report = runner.run(Selection::All).unwrap();

        assert_eq!(report.summary(), "Downloaded 2/3 models successfully");
        assert_eq!(report.succeeded, vec!["org/embedder", "org/reranker"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, "org/missing");
        assert!(report.failed[0].message.contains("not found"));

        let attempts = runner.fetcher.attempts.borrow();
        assert_eq!(attempts.len(), 3, "third model must still be attempted");
        assert_eq!(attempts[2].0, "org/reranker");
    }

    #[test]
    fn test_destination_is_under_base_dir() {
        let runner = BatchRunner::new(catalog(), "/models", ScriptedFetcher::failing(&[]));
        runner.run(Selection::Index(2)).unwrap();

        let attempts = runner.fetcher.attempts.borrow();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].1, PathBuf::from("/models/rerank"));
    }

    #[test]
    fn test_index_selection() {
        let runner = BatchRunner::new(catalog(), "/models", ScriptedFetcher::failing(&[]));
        let report = runner.run(Selection::Index(0)).unwrap();
        assert_eq!(report.summary(), "Downloaded 1/1 models successfully");
        assert!(report.all_succeeded());
    }

    #[test]
    fn test_index_out_of_range() {
        let runner = BatchRunner::new(catalog(), "/models", ScriptedFetcher::failing(&[]));
        assert_eq!(
            runner.run(Selection::Index(3)),
            Err(BatchError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert!(runner.fetcher.attempts.borrow().is_empty());
    }

    #[test]
    fn test_catalog_json_uses_camel_case() {
        let json = r#"{"models": [{"id": "org/a", "targetDir": "a", "description": "A"}]}"#;
        let catalog: ModelCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.models[0], ModelSpec::new("org/a", "a", "A"));
    }
}
