//! Advisor Registry: prompt operations loaded from a directory
//!
//! Every `*.yaml` / `*.yml` file in the prompts directory defines one
//! [`PromptOperation`], registered under the plugin namespace.

pub mod definition;
pub mod prompt;

pub use definition::OperationDefinition;
pub use prompt::{PromptOperation, MEMORIES_VAR};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use advisor_core::{AdvisorError, Operation, OperationRegistry};
use advisor_llm::ChatCompletion;
use advisor_memory::MemoryStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid operation definition: {0}")]
    Invalid(String),
    #[error("template of {name} does not compile: {message}")]
    Template { name: String, message: String },
    #[error(transparent)]
    Registration(#[from] AdvisorError),
}

impl From<RegistryError> for AdvisorError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Registration(inner) => inner,
            other => AdvisorError::Config(other.to_string()),
        }
    }
}

/// Definition files in `dir`, sorted by path.
pub fn definition_files(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let entries = std::fs::read_dir(dir).map_err(|e| RegistryError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| RegistryError::Io {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?
            .path();
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if path.is_file() && is_yaml {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loads every definition in `dir` into `registry` under `namespace` and
/// returns the registered names.
pub fn load_directory(
    dir: &Path,
    namespace: &str,
    registry: &mut OperationRegistry,
    chat: Arc<dyn ChatCompletion>,
    memory: Arc<dyn MemoryStore>,
) -> Result<Vec<String>, RegistryError> {
    let mut names = Vec::new();

    for path in definition_files(dir)? {
        let def = OperationDefinition::load(&path)?;
        let op = PromptOperation::new(def, chat.clone(), memory.clone())?;
        names.push(op.name().to_string());
        registry.register(namespace, Arc::new(op))?;
        tracing::debug!(path = %path.display(), namespace, "prompt operation loaded");
    }

    if names.is_empty() {
        tracing::warn!(dir = %dir.display(), "no prompt operations found");
    } else {
        tracing::info!(namespace, count = names.len(), "prompt operations registered");
    }
    Ok(names)
}

