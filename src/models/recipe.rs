//! Generated recipe parsing
//!
//! Recipe generation returns loosely structured text blocks:
//!
//! ```text
//! title: Fried rice
//! ingredients: rice -- egg -- soy sauce
//! directions: cook the rice -- fry with egg -- season
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const ITEM_SEPARATOR: &str = "--";

fn section_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?im)^\s*(title|ingredients|directions)\s*:\s*(.*?)\s*$")
            .unwrap_or_else(|e| panic!("invalid recipe section pattern: {}", e))
    })
}

/// A recipe split into its sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub directions: Vec<String>,
}

impl Recipe {
    /// Parse a generated recipe; `None` when no title section is present
    pub fn parse(text: &str) -> Option<Self> {
        let mut title = None;
        let mut ingredients = Vec::new();
        let mut directions = Vec::new();

        for captures in section_pattern().captures_iter(text) {
            let body = captures.get(2).map_or("", |m| m.as_str());
            match captures[1].to_lowercase().as_str() {
                "title" => title = Some(body.to_string()),
                "ingredients" => ingredients.extend(split_items(body)),
                "directions" => directions.extend(split_items(body)),
                _ => {}
            }
        }

        title
            .filter(|title| !title.is_empty())
            .map(|title| Self {
                title,
                ingredients,
                directions,
            })
    }

    /// Human-readable message body
    pub fn render(&self) -> String {
        let mut out = self.title.clone();

        if !self.ingredients.is_empty() {
            out.push_str("\n\nIngredients:");
            for item in &self.ingredients {
                out.push_str("\n- ");
                out.push_str(item);
            }
        }

        if !self.directions.is_empty() {
            out.push_str("\n\nDirections:");
            for (i, step) in self.directions.iter().enumerate() {
                out.push_str(&format!("\n{}. {}", i + 1, step));
            }
        }

        out
    }
}

/// Render raw recipe text, falling back to the text itself when it does not parse
pub fn render_recipe_text(text: &str) -> String {
    Recipe::parse(text)
        .map(|recipe| recipe.render())
        .unwrap_or_else(|| text.trim().to_string())
}

fn split_items(body: &str) -> impl Iterator<Item = String> + '_ {
    body.split(ITEM_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}
