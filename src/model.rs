use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::ingredients::IngredientList;

/// Adaptation note used when the model skips one in video-guided mode
pub const DEFAULT_ADAPTATION_NOTE: &str =
    "Recipe adapted using a YouTube tutorial; minor ingredient adjustments may have been applied.";

/// Longest cleaned video title that may replace the model's title
pub const MAX_VIDEO_TITLE_LEN: usize = 70;

/// A single user action asking for a recipe
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub ingredients: IngredientList,
    pub include_video: bool,
}

/// A matched cooking video used as style guidance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoContext {
    #[serde(rename = "id")]
    pub video_id: String,
    pub title: String,
    #[serde(rename = "channel")]
    pub channel_name: String,
    #[serde(rename = "description")]
    pub short_description: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

impl RecipeIngredient {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: Some(quantity.into()),
        }
    }
}

/// The recipe returned to the browser client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePayload {
    pub title: String,
    pub summary: String,
    pub time: String,
    pub servings: u32,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub extras_mentioned: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptation_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoContext>,
    #[serde(default)]
    pub include_video: bool,
}

impl RecipePayload {
    /// The minimal object produced when fewer than two real ingredients remain
    pub fn refusal() -> Self {
        RecipePayload {
            title: "Invalid ingredients".to_string(),
            summary: "No valid ingredients detected. Please provide real food ingredients."
                .to_string(),
            time: "-".to_string(),
            servings: 0,
            ingredients: Vec::new(),
            steps: vec!["No recipe can be made with the provided inputs.".to_string()],
            extras_mentioned: Vec::new(),
            adaptation_note: None,
            video: None,
            include_video: false,
        }
    }

    /// Build a payload from whatever JSON object the model produced.
    ///
    /// Missing or oddly typed fields are repaired; a payload without any
    /// usable step is replaced by the refusal payload.
    pub fn from_model_value(value: &Value) -> Self {
        let steps: Vec<String> = value["steps"]
            .as_array()
            .map(|steps| {
                steps
                    .iter()
                    .map(|s| strip_step_marker(&value_to_text(s)).to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if steps.is_empty() {
            return Self::refusal();
        }

        let ingredients = value["ingredients"]
            .as_array()
            .map(|items| items.iter().filter_map(ingredient_from_value).collect())
            .unwrap_or_default();

        let extras_mentioned = value["extrasMentioned"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|i| value_to_text(i).trim().to_string())
                    .filter(|i| !i.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        RecipePayload {
            title: text_or(&value["title"], "Untitled recipe"),
            summary: text_or(&value["summary"], ""),
            time: text_or(&value["time"], "-"),
            servings: servings_from_value(&value["servings"]).unwrap_or(2),
            ingredients,
            steps,
            extras_mentioned,
            adaptation_note: value["adaptationNote"]
                .as_str()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from),
            video: None,
            include_video: false,
        }
    }
}

/// Render a JSON value the way a loosely typed client would print it
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Accepts integers, floats and numeric strings ("4", "4 people" is rejected)
pub(crate) fn servings_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_or(value: &Value, default: &str) -> String {
    let text = value_to_text(value);
    let text = text.trim();
    if text.is_empty() {
        default.to_string()
    } else {
        text.to_string()
    }
}

fn ingredient_from_value(value: &Value) -> Option<RecipeIngredient> {
    let (name, quantity) = match value {
        Value::Object(map) => (
            map.get("name").map(value_to_text).unwrap_or_default(),
            map.get("quantity").map(value_to_text),
        ),
        other => (value_to_text(other), None),
    };

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(RecipeIngredient {
        name: name.to_string(),
        quantity: quantity
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
    })
}

fn step_marker() -> &'static Regex {
    static STEP_MARKER: OnceLock<Regex> = OnceLock::new();
    STEP_MARKER.get_or_init(|| {
        // Number markers need trailing whitespace so "1.5 cups" and "2-3 tbsp" survive
        Regex::new(r"^(?:\s*(?:(?:\d+\s*[.):-]|-)(?:\s+|$)|[•*·]\s*))+")
            .expect("step marker regex is valid")
    })
}

/// Remove leading enumeration ("1.", "2)") and bullet glyphs from a step
pub fn strip_step_marker(step: &str) -> &str {
    let trimmed = step.trim();
    match step_marker().find(trimmed) {
        Some(m) => trimmed[m.end()..].trim(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_step_marker() {
        assert_eq!(strip_step_marker("1. Boil water"), "Boil water");
        assert_eq!(strip_step_marker("  2) Salt it"), "Salt it");
        assert_eq!(strip_step_marker("• Stir"), "Stir");
        assert_eq!(strip_step_marker("- 3. Serve"), "Serve");
        assert_eq!(strip_step_marker("Bake for 20 minutes"), "Bake for 20 minutes");
        assert_eq!(strip_step_marker("350F oven"), "350F oven");
    }

    #[test]
    fn test_strip_step_marker_keeps_quantities() {
        assert_eq!(
            strip_step_marker("1.5 cups of stock go into the pot"),
            "1.5 cups of stock go into the pot"
        );
        assert_eq!(
            strip_step_marker("2-3 tablespoons of oil heat in a pan"),
            "2-3 tablespoons of oil heat in a pan"
        );
        assert_eq!(strip_step_marker("1. 1.5 cups of stock"), "1.5 cups of stock");
        assert_eq!(strip_step_marker("-5 degrees is cold enough"), "-5 degrees is cold enough");
    }

    #[test]
    fn test_from_model_value_complete() {
        let value = json!({
            "title": "Caprese Salad",
            "summary": "Fresh and bright.",
            "time": "10 minutes",
            "servings": 2,
            "ingredients": [
                {"name": "tomato", "quantity": "2 pieces"},
                {"name": "basil"}
            ],
            "steps": ["1. Slice the tomatoes", "Layer with basil"],
            "extrasMentioned": ["olive oil"]
        });

        let recipe = RecipePayload::from_model_value(&value);
        assert_eq!(recipe.title, "Caprese Salad");
        assert_eq!(recipe.servings, 2);
        assert_eq!(recipe.ingredients[0], RecipeIngredient::new("tomato", "2 pieces"));
        assert_eq!(recipe.ingredients[1].quantity, None);
        assert_eq!(recipe.steps, vec!["Slice the tomatoes", "Layer with basil"]);
        assert_eq!(recipe.extras_mentioned, vec!["olive oil"]);
        assert!(recipe.adaptation_note.is_none());
    }

    #[test]
    fn test_from_model_value_repairs_types() {
        let value = json!({
            "title": "  ",
            "servings": "4",
            "ingredients": ["rice", {"name": "", "quantity": "1 cup"}, {"name": "egg", "quantity": 2}],
            "steps": ["Cook rice", 42, "   "]
        });

        let recipe = RecipePayload::from_model_value(&value);
        assert_eq!(recipe.title, "Untitled recipe");
        assert_eq!(recipe.time, "-");
        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[1], RecipeIngredient::new("egg", "2"));
        assert_eq!(recipe.steps, vec!["Cook rice", "42"]);
    }

    #[test]
    fn test_missing_steps_becomes_refusal() {
        let value = json!({"title": "Half a recipe", "steps": []});
        assert_eq!(RecipePayload::from_model_value(&value), RecipePayload::refusal());

        let value = json!({"title": "No steps at all"});
        assert_eq!(RecipePayload::from_model_value(&value), RecipePayload::refusal());
    }

    #[test]
    fn test_refusal_serializes_in_client_shape() {
        let value = serde_json::to_value(RecipePayload::refusal()).unwrap();
        assert_eq!(value["servings"], 0);
        assert_eq!(value["extrasMentioned"], json!([]));
        assert_eq!(value["includeVideo"], false);
        assert!(value.get("video").is_none());
        assert!(value.get("adaptationNote").is_none());
    }

    #[test]
    fn test_video_context_field_names() {
        let video = VideoContext {
            video_id: "abc123".to_string(),
            title: "Pasta".to_string(),
            channel_name: "Chef".to_string(),
            short_description: "Tasty".to_string(),
            url: "https://www.youtube.com/watch?v=abc123".to_string(),
        };
        let value = serde_json::to_value(&video).unwrap();
        assert_eq!(value["id"], "abc123");
        assert_eq!(value["channel"], "Chef");
        assert_eq!(value["description"], "Tasty");
    }
}
