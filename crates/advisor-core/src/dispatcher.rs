//! Dispatcher: Resolves an operation and maps its outcome to an ExecutionResult
use std::sync::Arc;
use std::time::Instant;

use crate::context::ExecutionContext;
use crate::data_model::ExecutionResult;
use crate::error::AdvisorError;
use crate::operation::OperationError;
use crate::registry::OperationRegistry;

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<OperationRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Executes `namespace.operation` once. No retries, no timeout.
    ///
    /// * lookup miss → `Err(AdvisorError::NotFound)`
    /// * `OperationError::Failed` → `Ok(ExecutionResult { success: false })`
    /// * `OperationError::Collaborator` → `Err(AdvisorError::Collaborator)`
    pub async fn execute(
        &self,
        namespace: &str,
        operation: &str,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionResult, AdvisorError> {
        let op = self.registry.get(namespace, operation).ok_or_else(|| {
            tracing::warn!(namespace, operation, trace_id = %ctx.trace_id, "operation not found");
            AdvisorError::NotFound(operation.to_string())
        })?;

        let start = Instant::now();
        let outcome = op.invoke(ctx).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => {
                tracing::debug!(namespace, operation, trace_id = %ctx.trace_id, latency_ms, "operation succeeded");
                Ok(ExecutionResult::succeeded(output))
            }
            Err(OperationError::Failed(msg)) => {
                tracing::warn!(namespace, operation, trace_id = %ctx.trace_id, latency_ms, error = %msg, "operation failed");
                Ok(ExecutionResult::failed(msg))
            }
            Err(OperationError::Collaborator(msg)) => {
                tracing::error!(namespace, operation, trace_id = %ctx.trace_id, latency_ms, error = %msg, "collaborator failure during operation");
                Err(AdvisorError::Collaborator(msg))
            }
        }
    }
}
