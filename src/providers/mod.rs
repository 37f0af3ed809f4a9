mod google;
pub mod mock;

pub use google::GeminiProvider;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RecipeError;

/// One call to a text generation service
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_instruction: Option<String>,
    pub prompt: String,
    /// When present the service is asked to constrain output to this schema
    pub response_schema: Option<Value>,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn structured(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// Unified trait for text generation backends
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name (e.g., "google")
    fn provider_name(&self) -> &str;

    /// Model identifier reported by diagnostics
    fn model(&self) -> &str;

    /// Send the request and return the generated text (possibly empty)
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RecipeError>;
}
