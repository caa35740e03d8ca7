//! Workflows read from a local directory

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

use crate::source::{SourceError, WorkflowSource, is_workflow_file};

/// Reads workflow files directly inside a directory (not recursively)
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait::async_trait]
impl WorkflowSource for LocalSource {
    /// Files are returned sorted by name.
    async fn fetch_workflows(&self) -> Result<IndexMap<String, String>, SourceError> {
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| SourceError::Io { path, source }
        };

        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(io_error(&self.root))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&self.root))? {
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !is_workflow_file(&name) || !path.is_file() {
                continue;
            }
            files.push((name, path));
        }
        files.sort();

        let mut workflows = IndexMap::with_capacity(files.len());
        for (name, path) in files {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(io_error(&path))?;
            workflows.insert(name, content);
        }

        debug!("Read {} workflows from {:?}", workflows.len(), self.root);
        Ok(workflows)
    }
}
