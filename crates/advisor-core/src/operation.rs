//! Operation Trait: single contract for every dispatchable callable
use async_trait::async_trait;

use crate::context::ExecutionContext;

/// A named callable exposed to the dispatcher.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Name within its namespace (ex: "MemoryQuery")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Runs the operation against a read-only context.
    async fn invoke(&self, ctx: &ExecutionContext) -> Result<String, OperationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The operation itself rejected the request or could not produce output.
    Failed(String),
    /// A collaborator (model, memory store, cloud API) failed underneath.
    Collaborator(String),
}

impl OperationError {
    pub fn message(&self) -> &str {
        match self {
            Self::Failed(msg) | Self::Collaborator(msg) => msg,
        }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Failed(msg) => write!(f, "OP/FAILED: {}", msg),
            Self::Collaborator(msg) => write!(f, "OP/COLLABORATOR: {}", msg),
        }
    }
}

impl std::error::Error for OperationError {}
