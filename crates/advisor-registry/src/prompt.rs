//! Prompt operation: recall → render → complete
use std::sync::Arc;

use advisor_core::{ExecutionContext, Operation, OperationError};
use advisor_llm::{ChatCompletion, CompletionSettings};
use advisor_memory::{MemoryStore, RecallParams};
use async_trait::async_trait;
use handlebars::Handlebars;
use serde_json::Value;

use crate::definition::OperationDefinition;
use crate::RegistryError;

/// Template variable holding recalled texts.
pub const MEMORIES_VAR: &str = "memories";

pub struct PromptOperation {
    name: String,
    description: String,
    recall: bool,
    settings: CompletionSettings,
    handlebars: Handlebars<'static>,
    chat: Arc<dyn ChatCompletion>,
    memory: Arc<dyn MemoryStore>,
}

impl PromptOperation {
    /// Compiles the template up front so a broken file fails start-up.
    pub fn new(
        def: OperationDefinition,
        chat: Arc<dyn ChatCompletion>,
        memory: Arc<dyn MemoryStore>,
    ) -> Result<Self, RegistryError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(&def.name, &def.template)
            .map_err(|e| RegistryError::Template {
                name: def.name.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: def.name,
            description: def.description,
            recall: def.recall,
            settings: def.completion,
            handlebars,
            chat,
            memory,
        })
    }

    /// Renders the prompt for `ctx`, recalling memories first when enabled.
    pub async fn render(&self, ctx: &ExecutionContext) -> Result<String, OperationError> {
        let mut data = ctx.to_json();

        if self.recall {
            let params = RecallParams::from_context(ctx)?;
            let matches = params.recall(self.memory.as_ref(), ctx.input()).await?;
            tracing::debug!(
                operation = %self.name,
                collection = %params.collection,
                recalled = matches.len(),
                "memories recalled"
            );
            let texts: Vec<Value> = matches.into_iter().map(|m| Value::String(m.text)).collect();
            if let Value::Object(map) = &mut data {
                map.insert(MEMORIES_VAR.to_string(), Value::Array(texts));
            }
        }

        self.handlebars
            .render(&self.name, &data)
            .map_err(|e| OperationError::Failed(format!("Render error: {}", e)))
    }
}

#[async_trait]
impl Operation for PromptOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, ctx: &ExecutionContext) -> Result<String, OperationError> {
        let prompt = self.render(ctx).await?;
        self.chat
            .complete(&prompt, &self.settings)
            .await
            .map_err(|e| OperationError::Collaborator(e.to_string()))
    }
}
