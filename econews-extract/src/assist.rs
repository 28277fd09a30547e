//! Gemini generateContent client for assisted extraction

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ExtractError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Phrases the model answers with when it could not read the page.
/// Checked case-insensitively against the whole output.
pub const REFUSAL_MARKERS: &[&str] = &[
    "cannot access",
    "unable to access",
    "không thể truy cập",
    "failed to retrieve",
    "error occurred",
    "sorry, i cannot",
    "not available",
    "access denied",
    "forbidden",
];

/// True when the model answered with an excuse instead of article text.
pub fn is_refusal(text: &str) -> bool {
    let lowered = text.to_lowercase();
    REFUSAL_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Gemini API client
pub struct AssistClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl AssistClient {
    /// Create a new assist client
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout,
        }
    }

    /// Check if the client is configured (has an API key)
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Ask the model to read `url` and return formatted article text.
    ///
    /// Length and refusal gates are applied by the chain driver, not here.
    #[instrument(skip(self))]
    pub async fn extract_article(&self, url: &str) -> Result<String, ExtractError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: extraction_instruction(url),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                top_p: 0.8,
                max_output_tokens: 2800,
            },
        };

        debug!("Requesting assisted extraction: {}", url);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ExtractError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::ParseError(e.to_string()))?;

        let text = payload
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts.unwrap_or_default())
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();

        if text.is_empty() {
            return Err(ExtractError::NoContent("empty model response".to_string()));
        }

        debug!("Assisted extraction returned {} chars", text.len());

        Ok(text.to_string())
    }
}

fn extraction_instruction(url: &str) -> String {
    format!(
        "Extract the main article content from: {url}\n\n\
         Return only the article body in English, keeping figures, company names \
         and technical terms intact. Use **Header** lines between sections, note \
         images as [📷 Media], and separate paragraphs with blank lines. \
         Length: 500-1000 words."
    )
}

/// generateContent request
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// generateContent response, reduced to the fields the chain reads
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_markers() {
        assert!(is_refusal("I'm sorry, I cannot access that page."));
        assert!(is_refusal("Trang này không thể truy cập được."));
        assert!(is_refusal("HTTP 403 FORBIDDEN"));
        assert!(!is_refusal(
            "The central bank held rates steady for the third consecutive meeting."
        ));
    }

    #[test]
    fn test_unconfigured_client() {
        let client = AssistClient::new(String::new(), Duration::from_secs(35));
        assert!(!client.is_configured());
        let client = AssistClient::new("key".to_string(), Duration::from_secs(35));
        assert!(client.is_configured());
    }

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                top_p: 0.8,
                max_output_tokens: 2800,
            },
        };
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(encoded["generationConfig"]["topP"], 0.8);
        assert_eq!(encoded["generationConfig"]["maxOutputTokens"], 2800);
    }

    #[test]
    fn test_response_text_assembly() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "part one "}, {"text": "part two"}]}}
            ]
        }"#;
        let payload: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text: String = payload
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts.unwrap_or_default())
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        assert_eq!(text, "part one part two");
    }
}
