pub mod config;
pub mod error;
pub mod ingredients;
pub mod model;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod providers;
pub mod relay;
pub mod server;
pub mod video;

pub use config::AppConfig;
pub use error::RecipeError;
pub use ingredients::IngredientList;
pub use model::{GenerationRequest, RecipeIngredient, RecipePayload, VideoContext};
pub use orchestrator::{PingResponse, RecipeOrchestrator};
pub use parse::{parse_model_text, ParseOutcome};
pub use relay::EmailRelay;
pub use server::{router, AppState};
