use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{AnswersQuery, Candidate, QaService};

/// A scripted reply from [`MockQaService`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Answers(Vec<Candidate>),
    Fail(String),
}

/// A scripted knowledge base for tests. Returns pre-defined replies in
/// order and records every query it receives.
pub struct MockQaService {
    replies: Vec<MockReply>,
    index: AtomicUsize,
    queries: Mutex<Vec<AnswersQuery>>,
}

impl MockQaService {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with a single candidate.
    pub fn answering(answer: &str, confidence: f64) -> Self {
        Self::new(vec![MockReply::Answers(vec![Candidate::new(
            answer, confidence,
        )])])
    }

    /// Number of times the service was called.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Queries received so far, oldest first.
    pub fn queries(&self) -> Vec<AnswersQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QaService for MockQaService {
    async fn get_answers(&self, query: &AnswersQuery) -> Result<Vec<Candidate>> {
        self.queries.lock().unwrap().push(query.clone());
        let i = self.index.fetch_add(1, Ordering::SeqCst);

        // A single scripted reply repeats forever
        let reply = match self.replies.len() {
            1 => &self.replies[0],
            _ => self.replies.get(i).ok_or_else(|| {
                anyhow::anyhow!("MockQaService: no more replies (called {} times)", i + 1)
            })?,
        };

        match reply {
            MockReply::Answers(candidates) => Ok(candidates.clone()),
            MockReply::Fail(msg) => bail!("{msg}"),
        }
    }
}
