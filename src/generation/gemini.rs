//! HTTP client for the Gemini image-editing endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::{base64, ImagePayload};
use crate::config::GeminiConfig;
use crate::error::{AppError, Result};
use crate::generation::traits::{ImageTransformer, TransformOutput};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` backend
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerateRequest<'a> {
    contents: Vec<ApiContent<'a>>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct ApiContent<'a> {
    parts: Vec<ApiRequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequestPart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiRequestBlob<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequestBlob<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidateContent {
    #[serde(default)]
    parts: Vec<ApiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponsePart {
    #[serde(default, alias = "inline_data")]
    inline_data: Option<ApiResponseBlob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponseBlob {
    #[serde(default)]
    data: String,
    #[serde(default, alias = "mime_type")]
    mime_type: Option<String>,
}

impl ApiGenerateResponse {
    /// Only the first part of the first candidate is considered.
    fn first_image(&self) -> Option<&ApiResponseBlob> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .inline_data
            .as_ref()
            .filter(|blob| !blob.data.is_empty())
    }
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or(AppError::MissingCredential)?.to_string();

        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint_for_model(&config.api_base, &config.model),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint_for_model(api_base: &str, model: &str) -> String {
    let model = model.trim();
    let model_path = if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    };
    format!("{}/{}:generateContent", api_base.trim().trim_end_matches('/'), model_path)
}

#[async_trait]
impl ImageTransformer for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn transform(&self, image: &ImagePayload, instruction: &str) -> Result<TransformOutput> {
        let api_request = ApiGenerateRequest {
            contents: vec![ApiContent {
                parts: vec![
                    ApiRequestPart {
                        inline_data: Some(ApiRequestBlob {
                            mime_type: &image.mime_type,
                            data: base64::encode(&image.bytes),
                        }),
                        text: None,
                    },
                    ApiRequestPart {
                        inline_data: None,
                        text: Some(instruction),
                    },
                ],
            }],
            generation_config: ApiGenerationConfig {
                response_modalities: vec!["IMAGE"],
            },
        };

        debug!(
            endpoint = %self.endpoint,
            mime = %image.mime_type,
            size = image.bytes.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "Generation request failed");
                AppError::GenerationFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Generation API returned an error");
            return Err(AppError::GenerationFailed);
        }

        let api_response: ApiGenerateResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse generation response");
            AppError::GenerationFailed
        })?;

        let blob = api_response.first_image().ok_or_else(|| {
            warn!("Generation response carried no image");
            AppError::NoImageReturned
        })?;

        let bytes = base64::decode(&blob.data).map_err(|_| {
            warn!("Generation response image was not valid base64");
            AppError::GenerationFailed
        })?;

        debug!(size = bytes.len(), mime = ?blob.mime_type, "Received generated image");

        Ok(TransformOutput {
            bytes,
            mime_type: blob.mime_type.clone().filter(|m| !m.trim().is_empty()),
        })
    }
}
