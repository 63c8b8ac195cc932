//! Language model collaborator
//!
//! The wire format is out of scope; a model either streams text chunks or
//! returns the full text at once.

mod scripted;

pub use scripted::ScriptedModel;

use crate::error::CodemateResult;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of text chunks from the model
pub type ChunkStream = BoxStream<'static, CodemateResult<String>>;

/// A prompt for the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub system: String,
    pub prompt: String,
}

impl ModelRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Start generating and yield text as it arrives
    async fn stream(&self, request: ModelRequest) -> CodemateResult<ChunkStream>;

    /// Generate and return the whole text
    async fn complete(&self, request: ModelRequest) -> CodemateResult<String>;
}
