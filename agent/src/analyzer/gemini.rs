use crate::analyzer::transport::Transport;
use crate::error::{classify, AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Value shipped in the example environment file. Treated as "no key".
pub const PLACEHOLDER_API_KEY: &str = "YOUR_GEMINI_API_KEY";

const PROBE_PROMPT: &str =
    r#"Hello, this is a test message. Please respond with "Connection successful" if you receive this."#;

/// Gemini `generateContent` client. Single request per call.
pub struct GeminiClient {
    api_key: String,
    transport: Arc<dyn Transport>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeminiPart {
    pub text: String,
}

/// Sampling and length limits sent with every request. Unset options are omitted.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Tight limits for the connectivity check.
    pub const PROBE: GenerationConfig = GenerationConfig {
        temperature: 0.1,
        top_k: None,
        top_p: None,
        max_output_tokens: 50,
    };
}

impl GenerateContentRequest {
    pub fn new(prompt: &str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        }
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

/// Non-text parts (function calls, inline data) carry no `text`.
#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

impl GeminiResponse {
    fn candidate_count(&self) -> usize {
        self.candidates.as_ref().map_or(0, Vec::len)
    }

    /// Concatenated text of the first candidate, if it has any.
    fn first_text(self) -> Option<String> {
        let text = self
            .candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        (!text.is_empty()).then_some(text)
    }
}

impl GeminiClient {
    pub fn new(api_key: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: api_key.to_string(),
            transport,
        }
    }

    /// True iff the key is non-empty and not the example placeholder.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }

    /// Send one prompt and return the first candidate's text.
    pub async fn invoke(&self, prompt: &str, config: GenerationConfig) -> Result<String> {
        let req = GenerateContentRequest::new(prompt, config);

        let body = self
            .transport
            .generate_content(&self.api_key, &req)
            .await
            .map_err(|f| classify(&f))?;

        let data: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Gemini response is not the expected shape: {e}");
            AdvisorError::ResponseShape("AI response".to_string())
        })?;

        if let Some(usage) = &data.usage_metadata {
            debug!(
                "Gemini: {} tokens in, {} tokens out, {} candidates",
                usage.prompt_token_count,
                usage.candidates_token_count,
                data.candidate_count()
            );
        }

        data.first_text().ok_or_else(|| {
            warn!("Gemini returned no usable candidate");
            AdvisorError::ResponseShape("AI response".to_string())
        })
    }

    /// Minimal round trip. True when at least one candidate came back;
    /// a body we can't read counts as none.
    pub async fn probe(&self) -> Result<bool> {
        let req = GenerateContentRequest::new(PROBE_PROMPT, GenerationConfig::PROBE);

        let body = self
            .transport
            .generate_content(&self.api_key, &req)
            .await
            .map_err(|f| classify(&f))?;

        let count = serde_json::from_str::<GeminiResponse>(&body)
            .map(|r| r.candidate_count())
            .unwrap_or(0);

        debug!("Gemini probe: {count} candidates");
        Ok(count > 0)
    }
}
