//! Gemini-backed decision analyzer.
//!
//! Sends one `generateContent` request per analysis, asking for a JSON
//! response constrained to the analysis schema. No retries.

use super::prompt::{build_prompt, response_schema};
use super::{Analysis, AnalysisSource, AnalyzerError, DecisionAnalyzer};
use crate::models::{AnalysisResponse, Choice, Scenario};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

/// Connection settings for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key. `None` or blank selects the offline fallback.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: None,
            timeout_seconds: 60,
        }
    }
}

impl GeminiConfig {
    /// The configured key, if it is non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// `generateContent` response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Analyzer that calls the Gemini REST API.
pub struct GeminiAnalyzer {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiAnalyzer {
    pub fn new(config: GeminiConfig) -> Result<Self, AnalyzerError> {
        info!(
            "Initializing analyzer with model {} ({})",
            config.model,
            if config.credential().is_some() {
                "online"
            } else {
                "offline fallback"
            }
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn request_analysis(
        &self,
        api_key: &str,
        scenario: &Scenario,
        choice: &Choice,
    ) -> Result<AnalysisResponse, AnalyzerError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(scenario, choice),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: self.config.temperature,
            },
        };

        debug!(
            "Requesting analysis for {}/{} from {}",
            scenario.id, choice.id, self.config.model
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerError::Timeout
                } else if e.is_connect() {
                    AnalyzerError::Connect(self.config.api_url.clone())
                } else {
                    AnalyzerError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Status { status, body });
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = extract_text(body)?;
        parse_analysis(&text)
    }
}

#[async_trait]
impl DecisionAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, scenario: &Scenario, choice: &Choice) -> Analysis {
        let Some(api_key) = self.config.credential() else {
            debug!("No API key configured, returning offline analysis");
            return Analysis::offline();
        };

        match self.request_analysis(api_key, scenario, choice).await {
            Ok(response) => Analysis {
                response,
                source: AnalysisSource::Model,
            },
            Err(e) => {
                error!("Gemini analysis failed: {}", e);
                Analysis::degraded()
            }
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, AnalyzerError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AnalyzerError::EmptyResponse);
    }

    Ok(text)
}

/// Parse the model's JSON text into an analysis.
pub fn parse_analysis(text: &str) -> Result<AnalysisResponse, AnalyzerError> {
    let parsed: AnalysisResponse = serde_json::from_str(text.trim())?;

    if parsed.analysis.trim().is_empty() {
        return Err(AnalyzerError::EmptyAnalysis);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{offline_fallback, transient_fallback};
    use crate::catalog::Catalog;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single canned HTTP response; yields the raw request.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            // Read headers, then the declared body length.
            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break buf.len();
                }
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&buf).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn config_for(api_url: &str, api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(String::from),
            api_url: api_url.to_string(),
            timeout_seconds: 5,
            ..GeminiConfig::default()
        }
    }

    fn candidate_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_offline_without_key() {
        let catalog = Catalog::builtin();
        // Nothing listens here; a request would fail and yield the transient fallback.
        let analyzer = GeminiAnalyzer::new(config_for("http://127.0.0.1:1", None)).unwrap();

        for scenario in catalog.scenarios() {
            for choice in &scenario.choices {
                let result = analyzer.analyze(scenario, choice).await;
                assert_eq!(result.source, AnalysisSource::Offline);
                assert_eq!(result.response, offline_fallback());
            }
        }
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let catalog = Catalog::builtin();
        let (scenario, choice) = catalog.choice("s1", "c1_1").unwrap();
        let analyzer = GeminiAnalyzer::new(config_for("http://127.0.0.1:1", Some("  "))).unwrap();

        let result = analyzer.analyze(scenario, choice).await;
        assert_eq!(result.source, AnalysisSource::Offline);
    }

    #[tokio::test]
    async fn test_successful_analysis() {
        let catalog = Catalog::builtin();
        let (scenario, choice) = catalog.choice("s1", "c1_1").unwrap();

        let analysis = r#"{"analysis":"다수를 구하는 선택이었어요.","discussionQuestions":["a","b","c"],"keyEthicalConcepts":["공리주의","트롤리 딜레마"]}"#;
        let (url, server) = serve_once("200 OK", candidate_body(analysis)).await;

        let analyzer = GeminiAnalyzer::new(config_for(&url, Some("test-key"))).unwrap();
        let result = analyzer.analyze(scenario, choice).await;

        assert_eq!(result.source, AnalysisSource::Model);
        assert_eq!(result.response.analysis, "다수를 구하는 선택이었어요.");
        assert_eq!(result.response.discussion_questions.len(), 3);
        assert_eq!(result.response.key_ethical_concepts.len(), 2);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent"));
        assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains("\"responseMimeType\":\"application/json\""));
        assert!(request.contains("UTILITARIANISM"));
    }

    #[tokio::test]
    async fn test_error_status_degrades() {
        let catalog = Catalog::builtin();
        let (scenario, choice) = catalog.choice("s2", "c2_1").unwrap();
        let (url, server) =
            serve_once("500 Internal Server Error", r#"{"error":"boom"}"#.to_string()).await;

        let analyzer = GeminiAnalyzer::new(config_for(&url, Some("k"))).unwrap();
        let result = analyzer.analyze(scenario, choice).await;

        assert_eq!(result.source, AnalysisSource::Degraded);
        assert_eq!(result.response, transient_fallback());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_text_degrades() {
        let catalog = Catalog::builtin();
        let (scenario, choice) = catalog.choice("s3", "c3_2").unwrap();
        let (url, server) = serve_once("200 OK", candidate_body("not json at all")).await;

        let analyzer = GeminiAnalyzer::new(config_for(&url, Some("k"))).unwrap();
        let result = analyzer.analyze(scenario, choice).await;

        assert_eq!(result.source, AnalysisSource::Degraded);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_candidates_degrades() {
        let catalog = Catalog::builtin();
        let (scenario, choice) = catalog.choice("s3", "c3_1").unwrap();
        let (url, server) = serve_once("200 OK", r#"{"candidates":[]}"#.to_string()).await;

        let analyzer = GeminiAnalyzer::new(config_for(&url, Some("k"))).unwrap();
        let result = analyzer.analyze(scenario, choice).await;

        assert_eq!(result.source, AnalysisSource::Degraded);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_degrades() {
        let catalog = Catalog::builtin();
        let (scenario, choice) = catalog.choice("s1", "c1_2").unwrap();
        let analyzer = GeminiAnalyzer::new(config_for("http://127.0.0.1:1", Some("k"))).unwrap();

        let result = analyzer.analyze(scenario, choice).await;
        assert_eq!(result.source, AnalysisSource::Degraded);
        assert!(!result.response.analysis.is_empty());
    }

    #[test]
    fn test_parse_analysis() {
        let ok = parse_analysis(
            " {\"analysis\":\"x\",\"discussionQuestions\":[],\"keyEthicalConcepts\":[\"y\"]} ",
        )
        .unwrap();
        assert_eq!(ok.analysis, "x");

        assert!(matches!(
            parse_analysis(r#"{"analysis":"","discussionQuestions":[],"keyEthicalConcepts":[]}"#),
            Err(AnalyzerError::EmptyAnalysis)
        ));
        assert!(matches!(
            parse_analysis(r#"{"analysis":"x"}"#),
            Err(AnalyzerError::Parse(_))
        ));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "{\"a\":1}");

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            extract_text(empty),
            Err(AnalyzerError::EmptyResponse)
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let analyzer = GeminiAnalyzer::new(config_for("http://example.test/", None)).unwrap();
        assert_eq!(
            analyzer.endpoint(),
            "http://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
