use crate::core::{ImageModel, ModelPart, ModelRequest, ModelResponse};
use crate::utils::error::{Result, TryOnError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: RequestInlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

fn request_body(request: &ModelRequest) -> GenerateContentRequest<'_> {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            ModelPart::Text(text) => RequestPart::Text { text },
            ModelPart::Image(image) => RequestPart::InlineData {
                inline_data: RequestInlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            },
        })
        .collect();

    GenerateContentRequest {
        contents: vec![RequestContent { role: "user", parts }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE", "TEXT"],
        },
    }
}

/// Gemini `generateContent` over REST. Built once at startup and shared.
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| TryOnError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl ImageModel for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let url = self.endpoint();
        tracing::debug!("Making Gemini request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                TryOnError::model(format!("request failed: {}", e))
            })?;

        let status = response.status();
        tracing::debug!("Gemini response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned HTTP {}: {}", status, body);
            return Err(TryOnError::model(format!("HTTP {}: {}", status, body)));
        }

        response.json::<ModelResponse>().await.map_err(|e| {
            tracing::error!("Failed to decode Gemini response: {}", e);
            TryOnError::model(format!("undecodable response: {}", e))
        })
    }
}
