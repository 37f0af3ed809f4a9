use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Environment variables used by earlier deployments, mapped onto config keys.
///
/// They are applied as defaults, so `DEYCOOK__*` variables and `config.toml`
/// still win. Later entries replace earlier ones for the same key.
const LEGACY_VARS: &[(&str, &str)] = &[
    ("generation.api_key", "GEMINI_API_KEY"),
    ("generation.api_key", "GOOGLE_API_KEY"),
    ("generation.model", "MODEL_ID"),
    ("generation.mock", "MOCK_MODE"),
    ("video.api_key", "YOUTUBE_API_KEY"),
    ("relay.webhook_url", "ZAPIER_WEBHOOK_URL"),
    ("relay.brand_name", "BRAND_NAME"),
    ("server.port", "PORT"),
];

/// Process-wide configuration, loaded once at startup and never mutated
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Generation service settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Video lookup settings
    #[serde(default)]
    pub video: VideoConfig,
    /// Email webhook relay settings
    #[serde(default)]
    pub relay: RelayConfig,
    /// Prompt variant settings
    #[serde(default)]
    pub prompt: PromptConfig,
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for the Gemini generation service
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// API key; without one the service runs in mock mode
    pub api_key: Option<String>,
    /// Model identifier (e.g., "gemini-2.5-flash-lite")
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the generative language API
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Force mock mode even when a key is configured
    #[serde(default)]
    pub mock: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            video: VideoConfig::default(),
            relay: RelayConfig::default(),
            prompt: PromptConfig::default(),
            server: ServerConfig::default(),
            timeout: default_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_generation_base_url(),
            temperature: default_temperature(),
            mock: false,
        }
    }
}

/// Configuration for the optional video lookup
#[derive(Debug, Deserialize, Clone)]
pub struct VideoConfig {
    /// YouTube Data API key; the lookup is skipped without it
    pub api_key: Option<String>,
    #[serde(default = "default_video_base_url")]
    pub base_url: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_video_base_url(),
        }
    }
}

/// Configuration for the outbound email webhook
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Webhook that turns the posted payload into an email
    pub webhook_url: Option<String>,
    /// Brand name used in the email subject and body
    #[serde(default = "default_brand_name")]
    pub brand_name: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            brand_name: default_brand_name(),
        }
    }
}

/// Limits on how many ingredients the model may add on its own
#[derive(Debug, Deserialize, Clone)]
pub struct PromptConfig {
    /// Common pantry items (salt, oil, ...) the model may add in any mode
    #[serde(default = "default_pantry_extras_cap")]
    pub pantry_extras_cap: u32,
    /// Ingredients taken from a matched video in video-guided mode
    #[serde(default = "default_video_extras_cap")]
    pub video_extras_cap: u32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            pantry_extras_cap: default_pantry_extras_cap(),
            video_extras_cap: default_video_extras_cap(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// Default value functions
fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_video_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_brand_name() -> String {
    "DeyCook".to_string()
}

fn default_pantry_extras_cap() -> u32 {
    2
}

fn default_video_extras_cap() -> u32 {
    3
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with DEYCOOK__ prefix
    /// 2. config.toml file in current directory
    /// 3. Legacy variables (GOOGLE_API_KEY, MODEL_ID, ...)
    /// 4. Default values
    ///
    /// Environment variable format: DEYCOOK__GENERATION__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let builder = legacy_defaults(Config::builder())?;

        let settings = builder
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: DEYCOOK__GENERATION__MODEL
            .add_source(
                Environment::with_prefix("DEYCOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Whether generation requests are answered locally
    pub fn mock_mode(&self) -> bool {
        self.generation.mock || self.generation_key().is_none()
    }

    /// The generation API key, if a non-blank one is configured
    pub fn generation_key(&self) -> Option<&str> {
        non_blank(self.generation.api_key.as_deref())
    }

    /// The video lookup API key, if a non-blank one is configured
    pub fn video_key(&self) -> Option<&str> {
        non_blank(self.video.api_key.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn legacy_defaults(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (key, var) in LEGACY_VARS {
        if let Ok(value) = env::var(var) {
            builder = builder.set_default(*key, value)?;
        }
    }
    Ok(builder)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
