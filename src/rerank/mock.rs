use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{ReasoningService, RerankError, RerankPrompt};

#[derive(Debug, Clone)]
enum Reply {
    /// `{"ranking": [0, 1, ..]}` over every listed candidate.
    Echo,
    /// Same as `Echo`, highest index first.
    Reverse,
    Text(String),
    Fail,
}

/// Scripted reasoning service for tests.
///
/// Replies are consumed in order; the last one repeats once the script runs out.
#[derive(Debug)]
pub struct MockReasoner {
    script: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<RerankPrompt>>,
}

impl MockReasoner {
    fn scripted(reply: Reply) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([reply])),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Keeps the retrieval order.
    pub fn echo() -> Self {
        Self::scripted(Reply::Echo)
    }

    pub fn reverse() -> Self {
        Self::scripted(Reply::Reverse)
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::scripted(Reply::Text(text.into()))
    }

    pub fn failing() -> Self {
        Self::scripted(Reply::Fail)
    }

    /// Appends a text reply; it becomes the one that repeats.
    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Reply::Text(text.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<RerankPrompt> {
        self.last_prompt.lock().clone()
    }

    fn next_reply(&self) -> Reply {
        let mut script = self.script.lock();
        if script.len() > 1 {
            script.pop_front().unwrap_or(Reply::Fail)
        } else {
            script.front().cloned().unwrap_or(Reply::Fail)
        }
    }
}

impl ReasoningService for MockReasoner {
    async fn complete(&self, prompt: &RerankPrompt) -> Result<String, RerankError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.clone());

        let indices: Vec<usize> = (0..prompt.candidate_count).collect();
        match self.next_reply() {
            Reply::Echo => Ok(serde_json::json!({ "ranking": indices }).to_string()),
            Reply::Reverse => {
                let reversed: Vec<usize> = indices.into_iter().rev().collect();
                Ok(serde_json::json!({ "ranking": reversed }).to_string())
            }
            Reply::Text(text) => Ok(text),
            Reply::Fail => Err(RerankError::Service {
                reason: "injected failure".to_string(),
            }),
        }
    }
}
