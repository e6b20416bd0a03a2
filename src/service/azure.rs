use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{AnswersQuery, Candidate, QaService};

const QUERY_PATH: &str = "language/:query-knowledgebases";
const API_VERSION: &str = "2021-10-01";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Question answering backed by an Azure AI Language resource.
pub struct AzureQaService {
    client: reqwest::Client,
    endpoint: String,
    key: String,
}

impl AzureQaService {
    /// Build a client for `endpoint`. `timeout` of `None` keeps the
    /// transport default.
    pub fn new(endpoint: &str, key: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn build_url(&self, query: &AnswersQuery) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.endpoint, QUERY_PATH))
            .with_context(|| format!("invalid service endpoint: {}", self.endpoint))?;
        url.query_pairs_mut()
            .append_pair("projectName", &query.project_name)
            .append_pair("deploymentName", &query.deployment_name)
            .append_pair("api-version", API_VERSION);
        Ok(url)
    }

    fn parse_response(text: &str) -> Result<Vec<Candidate>> {
        let resp: ApiResponse = serde_json::from_str(text)
            .with_context(|| format!("malformed answer response: {text}"))?;

        Ok(resp
            .answers
            .into_iter()
            .map(|a| Candidate {
                answer: a.answer.unwrap_or_default(),
                confidence: a.confidence_score,
                source: a.source,
            })
            .collect())
    }

    /// Pull `error.message` out of an error body, or fall back to the raw text.
    fn error_message(text: &str) -> String {
        match serde_json::from_str::<ApiErrorResponse>(text) {
            Ok(body) => match body.error.code {
                Some(code) => format!("{}: {}", code, body.error.message),
                None => body.error.message,
            },
            Err(_) => text.trim().to_string(),
        }
    }
}

#[async_trait]
impl QaService for AzureQaService {
    async fn get_answers(&self, query: &AnswersQuery) -> Result<Vec<Candidate>> {
        let url = self.build_url(query)?;
        let body = ApiRequest {
            question: &query.question,
            top: query.top,
            confidence_score_threshold: query.confidence_threshold,
        };

        tracing::debug!(
            project = %query.project_name,
            deployment = %query.deployment_name,
            top = query.top,
            "querying knowledge base"
        );

        let resp = self
            .client
            .post(url)
            .header(KEY_HEADER, &self.key)
            .json(&body)
            .send()
            .await
            .context("request to question answering service failed")?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            bail!(
                "question answering API error ({}): {}",
                status,
                Self::error_message(&text)
            );
        }

        let candidates = Self::parse_response(&text)?;
        tracing::debug!(count = candidates.len(), "received candidates");
        Ok(candidates)
    }
}

// --- API types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    question: &'a str,
    top: u32,
    confidence_score_threshold: f64,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    answers: Vec<ApiAnswer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAnswer {
    answer: Option<String>,
    #[serde(default)]
    confidence_score: f64,
    source: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    code: Option<String>,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(endpoint: &str) -> AzureQaService {
        AzureQaService::new(endpoint, "test-key", None).unwrap()
    }

    fn query() -> AnswersQuery {
        AnswersQuery {
            question: "What is Microsoft Learn?".to_string(),
            project_name: "LearnFAQ".to_string(),
            deployment_name: "production".to_string(),
            top: 3,
            confidence_threshold: 0.3,
        }
    }

    #[test]
    fn url_has_path_and_query_params() {
        let url = service("https://my-lang.cognitiveservices.azure.com/")
            .build_url(&query())
            .unwrap();
        assert_eq!(url.host_str(), Some("my-lang.cognitiveservices.azure.com"));
        assert_eq!(url.path(), "/language/:query-knowledgebases");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("projectName".to_string(), "LearnFAQ".to_string())));
        assert!(pairs.contains(&("deploymentName".to_string(), "production".to_string())));
        assert!(pairs.contains(&("api-version".to_string(), "2021-10-01".to_string())));
    }

    #[test]
    fn url_without_trailing_slash() {
        let url = service("https://my-lang.cognitiveservices.azure.com")
            .build_url(&query())
            .unwrap();
        assert_eq!(url.path(), "/language/:query-knowledgebases");
    }

    #[test]
    fn url_escapes_project_name() {
        let mut q = query();
        q.project_name = "HR & Benefits".to_string();
        let url = service("https://example.com").build_url(&q).unwrap();
        let project = url
            .query_pairs()
            .find(|(k, _)| k == "projectName")
            .map(|(_, v)| v.into_owned());
        assert_eq!(project.as_deref(), Some("HR & Benefits"));
    }

    #[test]
    fn request_body_uses_camel_case() {
        let body = ApiRequest {
            question: "hi",
            top: 3,
            confidence_score_threshold: 0.3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["question"], "hi");
        assert_eq!(json["top"], 3);
        assert_eq!(json["confidenceScoreThreshold"], 0.3);
    }

    #[test]
    fn parse_answers() {
        let text = r#"{
            "answers": [
                {
                    "questions": ["What is Microsoft Learn?"],
                    "answer": "Microsoft Learn is a free online training platform.",
                    "confidenceScore": 0.87,
                    "id": 1,
                    "source": "faq.tsv",
                    "metadata": {}
                },
                {
                    "answer": "Second best.",
                    "confidenceScore": 0.41,
                    "id": 2
                }
            ]
        }"#;
        let candidates = AzureQaService::parse_response(text).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].answer,
            "Microsoft Learn is a free online training platform."
        );
        assert_eq!(candidates[0].confidence, 0.87);
        assert_eq!(candidates[0].source.as_deref(), Some("faq.tsv"));
        assert_eq!(candidates[1].source, None);
    }

    #[test]
    fn parse_empty_answers() {
        assert!(AzureQaService::parse_response(r#"{"answers": []}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn parse_missing_answers_field() {
        assert!(AzureQaService::parse_response("{}").unwrap().is_empty());
    }

    #[test]
    fn parse_missing_answer_text_is_empty() {
        let candidates =
            AzureQaService::parse_response(r#"{"answers": [{"confidenceScore": 0.5}]}"#).unwrap();
        assert_eq!(candidates[0].answer, "");
    }

    #[test]
    fn parse_malformed_fails() {
        let err = AzureQaService::parse_response("<html>gateway timeout</html>").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn error_message_from_json_body() {
        let text = r#"{"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}"#;
        assert_eq!(
            AzureQaService::error_message(text),
            "401: Access denied due to invalid subscription key."
        );
    }

    #[test]
    fn error_message_without_code() {
        let text = r#"{"error": {"message": "Project not found."}}"#;
        assert_eq!(AzureQaService::error_message(text), "Project not found.");
    }

    #[test]
    fn error_message_falls_back_to_raw_text() {
        assert_eq!(AzureQaService::error_message("  bad gateway \n"), "bad gateway");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        // Port 1 on loopback refuses connections
        let service = AzureQaService::new(
            "http://127.0.0.1:1",
            "test-key",
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        let err = service.get_answers(&query()).await.unwrap_err();
        assert!(err.to_string().contains("request to question answering service failed"));
    }
}
