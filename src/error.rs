use serde_json::Value;
use thiserror::Error;

/// Hint attached to 403 responses from the generation service.
pub const FORBIDDEN_HINT: &str = "Enable the Generative Language API for the project tied to your API key in Google AI Studio, or create a new key for a project where it is enabled.";

/// Client-facing message for transport failures
pub const GENERIC_FAILURE: &str = "Failed to generate recipe";

/// Errors that can occur while generating or relaying a recipe
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The ingredient list normalized to nothing
    #[error("{message}")]
    InvalidInput { message: String, received: Value },

    /// The generation service answered with a non-success status
    #[error("Generation service error ({status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// The model answered but no JSON object could be recovered from its text
    #[error("Invalid model response")]
    InvalidModelResponse { raw: String },

    /// The email webhook rejected the payload
    #[error("Webhook error ({status}): {message}")]
    Webhook {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// Request body for the relay endpoint failed validation
    #[error("{0}")]
    InvalidRelayRequest(String),

    /// A required setting is absent
    #[error("Missing {0}")]
    MissingConfig(String),

    /// Transport-level failure talking to an outbound service
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl RecipeError {
    /// HTTP status the error maps to when surfaced to a client
    pub fn status_code(&self) -> u16 {
        match self {
            RecipeError::InvalidInput { .. } | RecipeError::InvalidRelayRequest(_) => 400,
            RecipeError::Upstream { status, .. } | RecipeError::Webhook { status, .. } => {
                // A status outside 400..600 would not be an error to the client
                if (400..600).contains(status) {
                    *status
                } else {
                    500
                }
            }
            RecipeError::InvalidModelResponse { .. } => 502,
            RecipeError::MissingConfig(_)
            | RecipeError::Http(_)
            | RecipeError::Config(_) => 500,
        }
    }

    /// Message shown to the client, without the status prefix used in logs
    pub fn client_message(&self) -> String {
        match self {
            RecipeError::Upstream { message, .. } | RecipeError::Webhook { message, .. } => {
                message.clone()
            }
            // Transport errors can carry request URLs, which may hold keys
            RecipeError::Http(_) => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }

    /// Actionable hint for permission-class upstream failures
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RecipeError::Upstream { status: 403, .. } => Some(FORBIDDEN_HINT),
            _ => None,
        }
    }
}
