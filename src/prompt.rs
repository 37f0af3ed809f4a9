use serde_json::{json, Value};

use crate::config::PromptConfig;
use crate::model::{GenerationRequest, RecipePayload, VideoContext};

/// System instruction template for recipe generation.
///
/// Loaded from `prompt.txt` at compile time. `{{REFUSAL}}` and
/// `{{PANTRY_CAP}}` are filled in by [`PromptBuilder::system_instruction`].
pub const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("prompt.txt");

/// Literal shape restated in the unstructured fallback request
pub const FALLBACK_SHAPE_EXAMPLE: &str = r#"{"title":"","summary":"","time":"","servings":2,"ingredients":[{"name":"","quantity":""}],"steps":["..."],"extrasMentioned":["..."],"adaptationNote":""}"#;

/// Builds the system instruction and user prompts for one request
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    pantry_extras_cap: u32,
    video_extras_cap: u32,
}

impl PromptBuilder {
    pub fn new(config: &PromptConfig) -> Self {
        PromptBuilder {
            pantry_extras_cap: config.pantry_extras_cap,
            video_extras_cap: config.video_extras_cap,
        }
    }

    pub fn system_instruction(&self) -> String {
        // Serializing the refusal keeps the prompt and the parser in agreement
        let refusal = serde_json::to_value(RecipePayload::refusal())
            .map(|mut v| {
                if let Some(map) = v.as_object_mut() {
                    map.remove("includeVideo");
                }
                v.to_string()
            })
            .unwrap_or_default();

        SYSTEM_PROMPT_TEMPLATE
            .replace("{{REFUSAL}}", &refusal)
            .replace("{{PANTRY_CAP}}", &self.pantry_extras_cap.to_string())
    }

    pub fn user_prompt(&self, request: &GenerationRequest, video: Option<&VideoContext>) -> String {
        let mut prompt = format!("Ingredients:\n{}\n", request.ingredients.bullet_block());

        if request.include_video {
            prompt.push_str(
                "\nUser requested video-guided recipe generation (may add or omit some items to align with tutorial).\n",
            );
        }

        prompt.push_str(&format!(
            "\nConstraints:\n\
             - Correct obvious typos in ingredient names and ignore non-food/random words.\n\
             - If fewer than 2 valid ingredients remain after correction, produce the minimal refusal object specified in the system instructions.\n\
             - Output JSON ONLY with fields: title (string), summary (string), time (string), servings (number), ingredients (array of {{ name, quantity? }}), steps (string[]), extrasMentioned (string[]), adaptationNote (string optional).\n\
             - Ingredients: include the provided items; add at most {} common pantry items and only if needed. Provide quantities in common kitchen units (g, ml, tsp, tbsp, cups, pieces).\n\
             - Servings: default to 2 if unspecified.\n\
             - Time: realistic estimate.\n\
             - Steps: clear instructions as an array of strings (do NOT include leading numbers or bullets; the client will number them).",
            self.pantry_extras_cap
        ));

        if let Some(video) = video {
            prompt.push_str(&self.video_block(video));
        }

        prompt
    }

    fn video_block(&self, video: &VideoContext) -> String {
        format!(
            "\n\nA relevant YouTube cooking tutorial was found. Use it as authoritative style guidance.\n\
             VIDEO TITLE: {}\n\
             CHANNEL: {}\n\
             VIDEO DESCRIPTION (may contain extra or missing ingredients, adapt intelligently):\n\
             \"\"\"{}\"\"\"\n\
             Adjust steps to reflect professional best practice while respecting the user's ingredient list primarily. \
             If the video introduces additional common ingredients that substantially improve the dish, you MAY add up to {} of them, listing them ALSO inside extrasMentioned. \
             If any of the user's ingredients are absent from the video but still compatible, incorporate them logically. \
             Provide a short adaptationNote explaining deviations.",
            video.title, video.channel_name, video.short_description, self.video_extras_cap
        )
    }

    /// The user prompt plus an inline example of the expected JSON shape
    pub fn fallback_prompt(&self, user_prompt: &str) -> String {
        format!(
            "{}\n\nReturn ONLY a valid JSON object with these fields: {}",
            user_prompt, FALLBACK_SHAPE_EXAMPLE
        )
    }
}

/// Schema sent with structured requests
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "summary": { "type": "string" },
            "time": { "type": "string" },
            "servings": { "type": "integer" },
            "ingredients": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "quantity": { "type": "string" }
                    },
                    "required": ["name"]
                }
            },
            "steps": { "type": "array", "items": { "type": "string" } },
            "extrasMentioned": { "type": "array", "items": { "type": "string" } },
            "adaptationNote": { "type": "string" }
        },
        "required": ["title", "summary", "time", "servings", "ingredients", "steps"]
    })
}
