//! Turns a question into the single best answer from the knowledge base.

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::consts::DEFAULT_TOP;
use crate::service::{AnswersQuery, QaService};

/// The best answer for one question, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: Option<String>,
    pub confidence: f64,
}

impl Answer {
    /// No answer found, confidence 0.
    pub fn none() -> Self {
        Self {
            text: None,
            confidence: 0.0,
        }
    }

    pub fn is_found(&self) -> bool {
        self.text.is_some()
    }
}

/// Queries a [`QaService`] for a fixed project and deployment.
pub struct Retriever {
    service: Arc<dyn QaService>,
    project_name: String,
    deployment_name: String,
    top: u32,
}

impl Retriever {
    pub fn new(service: Arc<dyn QaService>, config: &Config) -> Self {
        Self {
            service,
            project_name: config.project_name.clone(),
            deployment_name: config.deployment_name.clone(),
            top: DEFAULT_TOP,
        }
    }

    /// Override how many ranked candidates are requested.
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = top;
        self
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn deployment_name(&self) -> &str {
        &self.deployment_name
    }

    /// Best answer for `question`. Service failures are logged and
    /// reported as "no answer", so callers never see an error.
    pub async fn get_answer(&self, question: &str, confidence_threshold: f64) -> Answer {
        Self::downgrade(self.try_get_answer(question, confidence_threshold).await)
    }

    /// Log a failed lookup and treat it as "no answer".
    pub fn downgrade(result: Result<Answer>) -> Answer {
        result.unwrap_or_else(|e| {
            tracing::warn!("Error getting answer: {:#}", e);
            Answer::none()
        })
    }

    /// Like [`get_answer`](Self::get_answer) but returns service failures.
    pub async fn try_get_answer(&self, question: &str, confidence_threshold: f64) -> Result<Answer> {
        let query = AnswersQuery {
            question: question.to_string(),
            project_name: self.project_name.clone(),
            deployment_name: self.deployment_name.clone(),
            top: self.top,
            confidence_threshold,
        };

        let candidates = self.service.get_answers(&query).await?;

        let Some(best) = candidates.into_iter().next() else {
            tracing::info!("no candidates above threshold {}", confidence_threshold);
            return Ok(Answer::none());
        };

        if best.answer.trim().is_empty() {
            return Ok(Answer::none());
        }

        tracing::info!(
            confidence = best.confidence,
            source = best.source.as_deref().unwrap_or("-"),
            "answer found"
        );

        Ok(Answer {
            text: Some(best.answer),
            confidence: best.confidence,
        })
    }
}
