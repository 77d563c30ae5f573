//! Google Gemini client using the `generateContent` REST endpoint.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use rujuk_core::TriageError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{http_client, llm_err, CompletionModel, LlmMetrics, LlmResponse};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorObject,
}

#[derive(Deserialize)]
struct ErrorObject {
    message: Option<String>,
    status: Option<String>,
}

/// Client for the Gemini API.
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: String,
    api_base: String,
}

impl GeminiClient {
    /// Creates a client for `model`. `api_base` defaults to [`GEMINI_API_BASE`].
    pub fn new(model: &str, api_key: &str, api_base: Option<&str>) -> Result<Self, TriageError> {
        Ok(Self {
            client: http_client()?,
            model: model.to_string(),
            api_key: api_key.to_string(),
            api_base: api_base
                .unwrap_or(GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<LlmResponse, TriageError> {
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(llm_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TriageError::Llm(format!(
                "Gemini API error {}: {}",
                status,
                error_message(&body)
            )));
        }

        let body: GenerateContentResponse = response.json().await.map_err(llm_err)?;
        extract_response(body, start.elapsed().as_millis() as u64)
    }
}

/// Pulls the human-readable message out of a Gemini error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorObject {
                message: Some(message),
                status,
            },
        }) => match status {
            Some(status) => format!("{} ({})", message, status),
            None => message,
        },
        _ => body.to_string(),
    }
}

/// Joins the text parts of the first candidate.
fn extract_response(body: GenerateContentResponse, elapsed_ms: u64) -> Result<LlmResponse, TriageError> {
    let (input_tokens, output_tokens) = body
        .usage_metadata
        .map(|u| (u.prompt_token_count.unwrap_or(0), u.candidates_token_count.unwrap_or(0)))
        .unwrap_or((0, 0));

    let Some(candidate) = body.candidates.into_iter().next() else {
        let reason = body
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".into());
        return Err(TriageError::Llm(format!("Gemini returned no answer: {}", reason)));
    };

    let content = candidate.content.ok_or_else(|| {
        TriageError::Llm(format!(
            "Gemini candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;

    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    debug!("Gemini finish reason: {:?}", candidate.finish_reason);
    if text.trim().is_empty() {
        return Err(TriageError::Llm(format!(
            "Gemini returned empty content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(LlmResponse {
        content: text,
        metrics: LlmMetrics {
            input_tokens,
            output_tokens,
            elapsed_ms,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_joined_parts_and_usage() {
        let body = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "  Neuro"}, {"text": "logy\n"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 57, "candidatesTokenCount": 3, "totalTokenCount": 60}
            }"#,
        );
        let resp = extract_response(body, 12).unwrap();
        assert_eq!(resp.content, "  Neurology\n");
        assert_eq!(resp.metrics.input_tokens, 57);
        assert_eq!(resp.metrics.output_tokens, 3);
        assert_eq!(resp.metrics.elapsed_ms, 12);
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let body = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        let err = extract_response(body, 0).unwrap_err();
        assert_eq!(err, TriageError::Llm("Gemini returned no answer: SAFETY".into()));
    }

    #[test]
    fn candidate_without_content_is_an_error() {
        let body = parse(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#);
        let err = extract_response(body, 0).unwrap_err().to_string();
        assert!(err.contains("MAX_TOKENS"), "{err}");
    }

    #[test]
    fn empty_parts_are_an_error_naming_the_finish_reason() {
        let body = parse(r#"{"candidates": [{"content": {"role": "model", "parts": []}, "finishReason": "SAFETY"}]}"#);
        let err = extract_response(body, 0).unwrap_err();
        assert_eq!(
            err,
            TriageError::Llm("Gemini returned empty content (finish reason: SAFETY)".into())
        );

        let body = parse(r#"{"candidates": [{"content": {"parts": [{"inlineData": {}}, {"text": " \n"}]}}]}"#);
        let err = extract_response(body, 0).unwrap_err().to_string();
        assert!(err.contains("empty content (finish reason: unknown)"), "{err}");
    }

    #[test]
    fn error_message_prefers_structured_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid. (INVALID_ARGUMENT)");
        assert_eq!(error_message("upstream exploded"), "upstream exploded");
    }

    async fn fake_generate(
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        if headers.get("x-goog-api-key").map(|v| v.as_bytes()) != Some(b"test-key".as_slice()) {
            return (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({"error": {"message": "bad key", "status": "PERMISSION_DENIED"}})),
            );
        }
        assert_eq!(call, "gemini-test:generateContent");
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
        assert_eq!(body["contents"][0]["role"], "user");
        let answer = if prompt.contains("headache") { " Neurology " } else { "Internal Medicine" };
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": answer}]}, "finishReason": "STOP"}]
            })),
        )
    }

    async fn spawn_fake_gemini() -> String {
        let app = Router::new().route("/models/{call}", post(fake_generate));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn round_trip_against_fake_upstream() {
        let base = spawn_fake_gemini().await;

        let client = GeminiClient::new("gemini-test", "test-key", Some(&base)).unwrap();
        let resp = client.complete("Symptoms: headache").await.unwrap();
        assert_eq!(resp.content, " Neurology ");

        let bad = GeminiClient::new("gemini-test", "wrong", Some(&format!("{}/", base))).unwrap();
        let err = bad.complete("Symptoms: headache").await.unwrap_err().to_string();
        assert!(err.contains("403"), "{err}");
        assert!(err.contains("bad key (PERMISSION_DENIED)"), "{err}");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_llm_error() {
        let client = GeminiClient::new("gemini-test", "k", Some("http://127.0.0.1:1")).unwrap();
        assert!(matches!(client.complete("hi").await, Err(TriageError::Llm(_))));
    }
}
