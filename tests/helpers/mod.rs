#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use ttyl::ai::{AiError, GenerateRequest, Generator};
use ttyl::store::EntryStore;

/// Open a fresh in-memory store with schema and migrations applied.
pub fn test_store() -> EntryStore {
    EntryStore::in_memory().unwrap()
}

/// Replies with queued answers in order, then fails. Records every prompt it sees.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, ()>>>,
    pub prompts: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|s| Ok(s.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            _ => Err(AiError::Status {
                status: 503,
                body: "unavailable".into(),
            }),
        }
    }
}

/// Replies with a fixed answer to every call.
pub struct EchoGenerator(pub &'static str);

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, _request: &GenerateRequest) -> Result<String, AiError> {
        Ok(self.0.to_string())
    }
}
