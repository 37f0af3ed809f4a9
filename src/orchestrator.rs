//! Turns a request body into a recipe: validation, optional video lookup,
//! prompting, one structured→plain fallback, parsing and normalization.

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::ingredients::IngredientList;
use crate::model::{GenerationRequest, RecipePayload, VideoContext, DEFAULT_ADAPTATION_NOTE};
use crate::parse::{parse_model_text, ParseOutcome};
use crate::prompt::{response_schema, PromptBuilder};
use crate::providers::mock::{mock_recipe, MOCK_MODEL, MOCK_PING_SAMPLE};
use crate::providers::{CompletionProvider, CompletionRequest, GeminiProvider};
use crate::video::{concise_title, VideoLookup, YouTubeSearch};

const PING_PROMPT: &str = "ping";
const PING_TEMPERATURE: f32 = 0.2;
const PING_SAMPLE_CHARS: usize = 40;

/// Pipeline stages, logged as a request moves through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validating,
    MockReturn,
    Generating,
    ParsingPrimary,
    ParsingFallback,
    Normalizing,
    Done,
    Errored,
}

fn enter(stage: Stage) {
    debug!("recipe pipeline: {:?}", stage);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingResponse {
    pub ok: bool,
    pub model: String,
    pub sample: String,
}

pub struct RecipeOrchestrator {
    /// `None` means mock mode: nothing leaves the process
    provider: Option<Arc<dyn CompletionProvider>>,
    videos: Arc<dyn VideoLookup>,
    prompts: PromptBuilder,
    temperature: f32,
}

impl RecipeOrchestrator {
    /// Build the live (or mock) pipeline described by the configuration
    pub fn new(config: &AppConfig) -> Result<Self, RecipeError> {
        let provider: Option<Arc<dyn CompletionProvider>> = if config.mock_mode() {
            info!("No generation key configured or mock mode enabled; serving mock recipes");
            None
        } else {
            Some(Arc::new(GeminiProvider::new(config)?))
        };

        Ok(Self::with_backends(
            config,
            provider,
            Arc::new(YouTubeSearch::new(config)?),
        ))
    }

    /// Build a pipeline around explicit backends
    pub fn with_backends(
        config: &AppConfig,
        provider: Option<Arc<dyn CompletionProvider>>,
        videos: Arc<dyn VideoLookup>,
    ) -> Self {
        RecipeOrchestrator {
            provider,
            videos,
            prompts: PromptBuilder::new(&config.prompt),
            temperature: config.generation.temperature,
        }
    }

    pub fn mock_mode(&self) -> bool {
        self.provider.is_none()
    }

    /// Generate a recipe from a raw request body
    pub async fn generate(&self, body: &Value) -> Result<RecipePayload, RecipeError> {
        enter(Stage::Validating);
        let ingredients = IngredientList::from_body(body).inspect_err(|_| enter(Stage::Errored))?;
        let request = GenerationRequest {
            ingredients,
            include_video: truthy(&body["includeVideo"]),
        };
        self.generate_for(&request).await
    }

    /// Generate a recipe for an already validated request
    pub async fn generate_for(
        &self,
        request: &GenerationRequest,
    ) -> Result<RecipePayload, RecipeError> {
        self.run(request)
            .await
            .inspect_err(|_| enter(Stage::Errored))
    }

    async fn run(&self, request: &GenerationRequest) -> Result<RecipePayload, RecipeError> {
        let Some(provider) = self.provider.as_deref() else {
            enter(Stage::MockReturn);
            return Ok(mock_recipe(&request.ingredients, request.include_video));
        };

        enter(Stage::Generating);
        let video = if request.include_video {
            self.videos.find(&request.ingredients).await
        } else {
            None
        };

        let user_prompt = self.prompts.user_prompt(request, video.as_ref());
        let text = self.complete_with_fallback(provider, &user_prompt).await?;

        enter(Stage::Normalizing);
        let value = match parse_model_text(&text) {
            ParseOutcome::Parsed(value) => value,
            ParseOutcome::Unparseable => {
                warn!("Model response could not be parsed as JSON");
                return Err(RecipeError::InvalidModelResponse { raw: text });
            }
        };

        let recipe = finish(RecipePayload::from_model_value(&value), request, video);
        enter(Stage::Done);
        Ok(recipe)
    }

    /// Structured call first; on failure exactly one plain call with the
    /// shape restated inline. The second failure is returned as is.
    async fn complete_with_fallback(
        &self,
        provider: &dyn CompletionProvider,
        user_prompt: &str,
    ) -> Result<String, RecipeError> {
        let system_instruction = Some(self.prompts.system_instruction());

        enter(Stage::ParsingPrimary);
        let structured = CompletionRequest {
            system_instruction: system_instruction.clone(),
            prompt: user_prompt.to_string(),
            response_schema: Some(response_schema()),
            temperature: self.temperature,
        };

        match provider.complete(&structured).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(
                    "Structured request to {} failed, falling back to plain JSON prompt: {}",
                    provider.provider_name(),
                    e
                );
                enter(Stage::ParsingFallback);
                let fallback = CompletionRequest {
                    system_instruction,
                    prompt: self.prompts.fallback_prompt(user_prompt),
                    response_schema: None,
                    temperature: self.temperature,
                };
                provider.complete(&fallback).await
            }
        }
    }

    /// Issue a trivial prompt to check credentials and model access
    pub async fn ping(&self) -> Result<PingResponse, RecipeError> {
        let Some(provider) = self.provider.as_deref() else {
            return Ok(PingResponse {
                ok: true,
                model: MOCK_MODEL.to_string(),
                sample: MOCK_PING_SAMPLE.to_string(),
            });
        };

        let request = CompletionRequest {
            system_instruction: None,
            prompt: PING_PROMPT.to_string(),
            response_schema: None,
            temperature: PING_TEMPERATURE,
        };
        let text = provider.complete(&request).await?;

        Ok(PingResponse {
            ok: true,
            model: provider.model().to_string(),
            sample: text.chars().take(PING_SAMPLE_CHARS).collect(),
        })
    }
}

/// Overlay request-level facts onto the model's recipe
fn finish(
    mut recipe: RecipePayload,
    request: &GenerationRequest,
    video: Option<VideoContext>,
) -> RecipePayload {
    if let Some(video) = video {
        if request.include_video && recipe.adaptation_note.is_none() {
            recipe.adaptation_note = Some(DEFAULT_ADAPTATION_NOTE.to_string());
        }
        if let Some(title) = concise_title(&video) {
            recipe.title = title;
        }
        recipe.video = Some(video);
    }
    recipe.include_video = request.include_video;
    recipe
}

/// Loose truthiness for flags posted by browser clients
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
