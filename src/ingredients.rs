use serde_json::Value;

use crate::error::RecipeError;
use crate::model::value_to_text;

/// Characters accepted between ingredients in a single free-text field
pub const DELIMITERS: [char; 9] = ['\n', ',', ';', '|', '·', '•', '—', '–', '\t'];

/// Ordered, non-empty list of trimmed ingredient names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientList(Vec<String>);

impl IngredientList {
    /// Extract ingredients from a request body of unknown shape.
    ///
    /// Accepts `{"ingredients": [..]}`, `{"ingredients": "a, b\nc"}` or a bare
    /// JSON array as the whole body.
    pub fn from_body(body: &Value) -> Result<Self, RecipeError> {
        let raw: Vec<String> = match &body["ingredients"] {
            Value::Array(items) => items.iter().map(value_to_text).collect(),
            Value::String(text) => text.split(DELIMITERS).map(String::from).collect(),
            _ => match body {
                Value::Array(items) => items.iter().map(value_to_text).collect(),
                _ => Vec::new(),
            },
        };

        Self::from_entries(raw).ok_or_else(|| RecipeError::InvalidInput {
            message: "ingredients is required as array or comma/newline string".to_string(),
            received: body.clone(),
        })
    }

    /// Trim every entry and drop blanks; `None` when nothing is left
    pub fn from_entries<I, S>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list: Vec<String> = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        if list.is_empty() {
            None
        } else {
            Some(IngredientList(list))
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// The first `n` ingredients, used as a search query
    pub fn head(&self, n: usize) -> &[String] {
        &self.0[..self.0.len().min(n)]
    }

    /// One `- item` line per ingredient
    pub fn bullet_block(&self) -> String {
        self.0
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
