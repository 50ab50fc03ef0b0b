//! OpenAI / Azure OpenAI HTTP client
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::types::{
    ApiErrorBody, ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse,
};
use crate::{ChatCompletion, CompletionSettings, LlmError, TextEmbedding};

/// Default public OpenAI API root.
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    OpenAI,
    AzureOpenAI,
}

impl ServiceType {
    fn provider(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::AzureOpenAI => "azure-openai",
        }
    }
}

impl FromStr for ServiceType {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPENAI" => Ok(Self::OpenAI),
            "AZUREOPENAI" => Ok(Self::AzureOpenAI),
            _ => Err(LlmError::Config(format!("Invalid service type value: {}", s))),
        }
    }
}

/// Resolved model settings. `chat_model` / `embedding_model` are model ids
/// for OpenAI and deployment names for Azure OpenAI.
#[derive(Clone)]
pub struct ModelSettings {
    pub service_type: ServiceType,
    pub chat_model: String,
    pub embedding_model: String,
    pub endpoint: String,
    pub api_key: String,
    pub org_id: Option<String>,
    pub api_version: String,
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("service_type", &self.service_type)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("org_id", &self.org_id)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Route {
    Chat,
    Embeddings,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    settings: ModelSettings,
}

impl OpenAiClient {
    /// `timeout` bounds each request from connect to the end of the body.
    pub fn new(settings: ModelSettings, timeout: Duration) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;
        Self::with_client(http, settings)
    }

    pub fn with_client(http: Client, settings: ModelSettings) -> Result<Self, LlmError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::Config("missing API key".to_string()));
        }
        if settings.service_type == ServiceType::AzureOpenAI && settings.endpoint.trim().is_empty() {
            return Err(LlmError::Config(
                "Azure OpenAI requires an endpoint".to_string(),
            ));
        }
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    fn url(&self, route: Route) -> String {
        let (model, path) = match route {
            Route::Chat => (&self.settings.chat_model, "chat/completions"),
            Route::Embeddings => (&self.settings.embedding_model, "embeddings"),
        };

        match self.settings.service_type {
            ServiceType::OpenAI => {
                let base = if self.settings.endpoint.trim().is_empty() {
                    OPENAI_ENDPOINT
                } else {
                    self.settings.endpoint.trim_end_matches('/')
                };
                format!("{}/{}", base, path)
            }
            ServiceType::AzureOpenAI => format!(
                "{}/openai/deployments/{}/{}?api-version={}",
                self.settings.endpoint.trim_end_matches('/'),
                model,
                path,
                self.settings.api_version
            ),
        }
    }

    /// Model id sent in the body; Azure routes by deployment in the URL.
    fn body_model<'a>(&self, model: &'a str) -> Option<&'a str> {
        match self.settings.service_type {
            ServiceType::OpenAI => Some(model),
            ServiceType::AzureOpenAI => None,
        }
    }

    async fn post<Req: Serialize, Res: DeserializeOwned>(
        &self,
        route: Route,
        body: &Req,
    ) -> Result<Res, LlmError> {
        let provider = self.settings.service_type.provider();
        let mut request = self.http.post(self.url(route)).json(body);

        request = match self.settings.service_type {
            ServiceType::OpenAI => {
                let mut r = request.bearer_auth(&self.settings.api_key);
                if let Some(org) = self.settings.org_id.as_deref().filter(|o| !o.is_empty()) {
                    r = r.header("OpenAI-Organization", org);
                }
                r
            }
            ServiceType::AzureOpenAI => request.header("api-key", &self.settings.api_key),
        };

        let response = request.send().await.map_err(|e| LlmError::RequestFailed {
            provider,
            status: 0,
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| LlmError::InvalidResponse {
                provider,
                message: e.to_string(),
            });
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);

        tracing::warn!(provider, status = status.as_u16(), %message, "model request rejected");
        Err(LlmError::RequestFailed {
            provider,
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, prompt: &str, settings: &CompletionSettings) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.body_model(&self.settings.chat_model),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
        };

        let response: ChatResponse = self.post(Route::Chat, &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: self.settings.service_type.provider(),
                message: "no completion choices in response".to_string(),
            })
    }
}

#[async_trait]
impl TextEmbedding for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: self.body_model(&self.settings.embedding_model),
            input: texts,
        };

        let response: EmbeddingResponse = self.post(Route::Embeddings, &request).await?;
        if response.data.len() != texts.len() {
            return Err(LlmError::InvalidResponse {
                provider: self.settings.service_type.provider(),
                message: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    response.data.len()
                ),
            });
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn settings(service_type: ServiceType) -> ModelSettings {
        ModelSettings {
            service_type,
            chat_model: "gpt-35-turbo".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            endpoint: "https://contoso.openai.azure.com/".to_string(),
            api_key: "key".to_string(),
            org_id: None,
            api_version: "2023-05-15".to_string(),
        }
    }

    #[test]
    fn test_service_type_parsing() {
        assert_eq!("openai".parse::<ServiceType>().unwrap(), ServiceType::OpenAI);
        assert_eq!("AzureOpenAI".parse::<ServiceType>().unwrap(), ServiceType::AzureOpenAI);

        let err = "HuggingFace".parse::<ServiceType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid model configuration: Invalid service type value: HuggingFace");
    }

    #[test]
    fn test_azure_urls() {
        let client = OpenAiClient::new(settings(ServiceType::AzureOpenAI), TIMEOUT).unwrap();
        assert_eq!(
            client.url(Route::Chat),
            "https://contoso.openai.azure.com/openai/deployments/gpt-35-turbo/chat/completions?api-version=2023-05-15"
        );
        assert_eq!(
            client.url(Route::Embeddings),
            "https://contoso.openai.azure.com/openai/deployments/text-embedding-ada-002/embeddings?api-version=2023-05-15"
        );
    }

    #[test]
    fn test_openai_default_endpoint() {
        let mut s = settings(ServiceType::OpenAI);
        s.endpoint = String::new();
        let client = OpenAiClient::new(s, TIMEOUT).unwrap();
        assert_eq!(client.url(Route::Chat), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut s = settings(ServiceType::OpenAI);
        s.api_key = "  ".to_string();
        assert!(matches!(OpenAiClient::new(s, TIMEOUT), Err(LlmError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let s = settings(ServiceType::OpenAI);
        assert!(!format!("{:?}", s).contains("\"key\""));
    }
}
