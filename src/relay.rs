//! Forwards a finished recipe to an email automation webhook.

use html_escape::encode_text;
use log::{error, info, warn};
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::OnceLock;

use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::model::{servings_from_value, strip_step_marker, value_to_text};

/// The subset of a recipe that is mailed out, with every field filled in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafeRecipe {
    pub title: String,
    pub summary: String,
    pub time: String,
    pub servings: u32,
    pub ingredients: Vec<SafeIngredient>,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafeIngredient {
    pub name: String,
    /// Empty when the recipe gave no quantity
    pub quantity: String,
}

impl SafeRecipe {
    /// Fill defaults for a recipe posted by the client.
    ///
    /// Returns `None` when the recipe has no steps to send.
    pub fn from_value(recipe: &Value) -> Option<Self> {
        let steps: Vec<String> = recipe["steps"].as_array()?.iter().map(value_to_text).collect();
        if steps.is_empty() {
            return None;
        }

        let ingredients = recipe["ingredients"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|i| SafeIngredient {
                        name: value_to_text(&i["name"]),
                        quantity: value_to_text(&i["quantity"]),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(SafeRecipe {
            title: text_or(&recipe["title"], "Your Recipe"),
            summary: value_to_text(&recipe["summary"]),
            time: text_or(&recipe["time"], "-"),
            servings: servings_from_value(&recipe["servings"]).unwrap_or(2),
            ingredients,
            steps,
        })
    }
}

fn text_or(value: &Value, default: &str) -> String {
    let text = value_to_text(value);
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r".+@.+\..+").expect("valid regex"))
}

pub struct EmailRelay {
    client: Client,
    webhook_url: Option<String>,
    brand_name: String,
}

impl EmailRelay {
    pub fn new(config: &AppConfig) -> Result<Self, RecipeError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(EmailRelay {
            client,
            webhook_url: config
                .relay
                .webhook_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(String::from),
            brand_name: config.relay.brand_name.clone(),
        })
    }

    /// Validate `{email, recipe}` and post it to the webhook
    pub async fn send(&self, body: &Value) -> Result<(), RecipeError> {
        let email = value_to_text(&body["email"]).trim().to_string();
        if !email_pattern().is_match(&email) {
            return Err(RecipeError::InvalidRelayRequest(
                "A valid email is required".to_string(),
            ));
        }
        let recipe = SafeRecipe::from_value(&body["recipe"])
            .ok_or_else(|| RecipeError::InvalidRelayRequest("Recipe is required".to_string()))?;

        let url = self
            .webhook_url
            .as_deref()
            .ok_or_else(|| RecipeError::MissingConfig("webhook URL".to_string()))?;

        let payload = json!({
            "email": email,
            "htmlBody": self.html_body(&recipe),
            "subject": self.subject(&recipe),
            "recipe": recipe,
        });

        let response = match self.client.post(url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Webhook request failed: {}", e.without_url());
                return Err(RecipeError::Webhook {
                    status: 500,
                    message: "Failed to send via webhook".to_string(),
                    details: None,
                });
            }
        };

        let status = response.status();
        let out: Option<Value> = response.json().await.ok();

        if !status.is_success() {
            let message = out
                .as_ref()
                .and_then(|o| o["message"].as_str())
                .unwrap_or("Webhook delivery failed")
                .to_string();
            warn!("Webhook rejected recipe ({}): {}", status.as_u16(), message);
            return Err(RecipeError::Webhook {
                status: status.as_u16(),
                message,
                details: out,
            });
        }

        info!("Recipe {:?} relayed", recipe.title);
        Ok(())
    }

    pub fn subject(&self, recipe: &SafeRecipe) -> String {
        format!("Your {} Recipe: {}", self.brand_name, recipe.title)
    }

    /// Render the email body; all interpolated text is escaped
    pub fn html_body(&self, recipe: &SafeRecipe) -> String {
        let brand = encode_text(&self.brand_name);

        let ingredients = if recipe.ingredients.is_empty() {
            String::new()
        } else {
            let items: String = recipe
                .ingredients
                .iter()
                .map(|i| {
                    if i.quantity.is_empty() {
                        format!("<li>{}</li>", encode_text(&i.name))
                    } else {
                        format!(
                            "<li>{} — {}</li>",
                            encode_text(&i.name),
                            encode_text(&i.quantity)
                        )
                    }
                })
                .collect();
            format!(
                r#"<h3 style="margin:16px 0 6px 0">Ingredients</h3><ul>{}</ul>"#,
                items
            )
        };

        let steps: String = recipe
            .steps
            .iter()
            .map(|s| format!("<li>{}</li>", encode_text(strip_step_marker(s))))
            .collect();

        format!(
            r#"<div style="font-family:Inter,system-ui,Segoe UI,Arial,sans-serif;color:#111">
  <div style="font-weight:600;font-size:14px;margin-bottom:10px">{brand}</div>
  <h2 style="margin:0 0 8px 0">{title}</h2>
  <div style="color:#555;margin-bottom:8px">{time} • Serves {servings}</div>
  <p style="margin:0 0 12px 0">{summary}</p>
  {ingredients}
  <h3 style="margin:16px 0 6px 0">Steps</h3>
  <ol>{steps}</ol>
  <p style="margin-top:16px;color:#666">Sent via {brand}</p>
</div>"#,
            brand = brand,
            title = encode_text(&recipe.title),
            time = encode_text(&recipe.time),
            servings = recipe.servings,
            summary = encode_text(&recipe.summary),
            ingredients = ingredients,
            steps = steps,
        )
    }
}
