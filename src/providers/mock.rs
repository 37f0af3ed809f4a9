//! Canned answers used when no generation key is configured.

use crate::ingredients::IngredientList;
use crate::model::{RecipeIngredient, RecipePayload};

/// Model name reported by the ping endpoint in mock mode
pub const MOCK_MODEL: &str = "mock";

/// Sample text reported by the ping endpoint in mock mode
pub const MOCK_PING_SAMPLE: &str = "Pong!";

/// A deterministic recipe built from the ingredient names alone
pub fn mock_recipe(ingredients: &IngredientList, include_video: bool) -> RecipePayload {
    let list = ingredients.as_slice();
    let joined = list.join(", ");

    let lead = list.first().map(|i| capitalize(i)).unwrap_or_else(|| "Chef".to_string());
    let fusion = if list.len() > 1 { "fusion " } else { "" };

    let mut recipe_ingredients: Vec<RecipeIngredient> = list
        .iter()
        .map(|name| RecipeIngredient::new(name.as_str(), "to taste"))
        .collect();
    recipe_ingredients.extend([
        RecipeIngredient::new("olive oil", "1 tbsp"),
        RecipeIngredient::new("salt", "to taste"),
        RecipeIngredient::new("black pepper", "to taste"),
        RecipeIngredient::new("fresh herbs", "few sprigs"),
    ]);

    RecipePayload {
        title: format!("{}-style {}recipe", lead, fusion),
        summary: format!(
            "A refined, minimalist dish featuring {} with balanced seasoning and clean presentation.",
            joined
        ),
        time: "20 minutes".to_string(),
        servings: 2,
        ingredients: recipe_ingredients,
        steps: vec![
            "Prep all ingredients and set out your cookware.".to_string(),
            format!("Season {} lightly with salt and pepper.", joined),
            "Cook over medium heat with a touch of olive oil until aromatic and tender.".to_string(),
            "Adjust seasoning, plate neatly, garnish with herbs, and serve warm.".to_string(),
        ],
        extras_mentioned: ["salt", "pepper", "olive oil", "herbs"]
            .into_iter()
            .map(String::from)
            .collect(),
        adaptation_note: None,
        video: None,
        include_video,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
