pub mod azure;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;

/// One question sent to the knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswersQuery {
    pub question: String,
    pub project_name: String,
    pub deployment_name: String,
    /// Maximum number of ranked candidates to return.
    pub top: u32,
    /// Candidates scoring below this are dropped by the service.
    pub confidence_threshold: f64,
}

/// A ranked answer as returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub answer: String,
    pub confidence: f64,
    pub source: Option<String>,
}

impl Candidate {
    pub fn new(answer: impl Into<String>, confidence: f64) -> Self {
        Self {
            answer: answer.into(),
            confidence,
            source: None,
        }
    }
}

/// The remote knowledge base. Could be the hosted service or a test script.
///
/// Candidates come back best first.
#[async_trait]
pub trait QaService: Send + Sync {
    async fn get_answers(&self, query: &AnswersQuery) -> Result<Vec<Candidate>>;
}
