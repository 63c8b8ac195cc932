//! Model that replays canned replies

use super::{ChunkStream, ModelClient, ModelRequest};
use crate::error::{CodemateError, CodemateResult};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Replies with queued texts in order, recording every request.
///
/// Streaming splits a reply into the queued chunks; `complete` joins them.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Vec<String>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply delivered as the given chunks
    pub fn push_reply<I, S>(&self, chunks: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replies
            .lock()
            .push_back(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().clone()
    }

    fn next_reply(&self, request: ModelRequest) -> CodemateResult<Vec<String>> {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| CodemateError::model("no scripted reply left"))
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn stream(&self, request: ModelRequest) -> CodemateResult<ChunkStream> {
        let chunks = self.next_reply(request)?;
        Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
    }

    async fn complete(&self, request: ModelRequest) -> CodemateResult<String> {
        Ok(self.next_reply(request)?.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_then_complete() {
        let model = ScriptedModel::new();
        model.push_reply(["a", "b"]).push_reply(["whole"]);

        let chunks: Vec<_> = model
            .stream(ModelRequest::new("sys", "p1"))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(chunks.len(), 2);

        let text = model.complete(ModelRequest::new("sys", "p2")).await.unwrap();
        assert_eq!(text, "whole");
        assert_eq!(model.requests().len(), 2);

        assert!(model.complete(ModelRequest::new("sys", "p3")).await.is_err());
    }
}
