use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::providers::{CompletionProvider, CompletionRequest};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde_json::{json, Value};

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
}

impl GeminiProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &AppConfig) -> Result<Self, RecipeError> {
        let api_key = config
            .generation_key()
            .ok_or_else(|| RecipeError::MissingConfig("generation.api_key".to_string()))?
            .to_string();

        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(GeminiProvider {
            client,
            api_key,
            endpoint: generate_endpoint(&config.generation.base_url, &config.generation.model)?,
            model: config.generation.model.clone(),
        })
    }

    fn request_body(request: &CompletionRequest) -> Value {
        let mut generation_config = json!({ "temperature": request.temperature });
        if let Some(schema) = &request.response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }

        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }],
            "generationConfig": generation_config
        });

        if let Some(system) = &request.system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        body
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, RecipeError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(request))
            .send()
            .await
            // The URL carries the API key
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        // Error bodies are not always JSON; fall back to an empty object
        let response_body: Value = response.json().await.unwrap_or_else(|_| json!({}));
        debug!("Google Gemini response ({}): {:?}", status, response_body);

        if !status.is_success() {
            let message = response_body["error"]["message"]
                .as_str()
                .map(String::from)
                .or_else(|| status.canonical_reason().map(String::from))
                .unwrap_or_else(|| "Gemini API error".to_string());
            warn!("Google Gemini API error ({}): {}", status.as_u16(), message);

            return Err(RecipeError::Upstream {
                status: status.as_u16(),
                message,
                details: response_body["error"]
                    .get("details")
                    .filter(|d| !d.is_null())
                    .cloned(),
            });
        }

        Ok(candidate_text(&response_body))
    }
}

/// `{base}/models/{model}:generateContent`, with the model id encoded as one path segment
fn generate_endpoint(base_url: &str, model: &str) -> Result<Url, RecipeError> {
    let invalid = || RecipeError::MissingConfig(format!("valid generation.base_url ({})", base_url));

    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .push("models")
        .push(&format!("{}:generateContent", model));
    Ok(url)
}

/// Concatenate every text part of the first candidate
fn candidate_text(response_body: &Value) -> String {
    response_body["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}
