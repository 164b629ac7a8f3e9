//! Dialog catalog
//!
//! The closed set of waterfall dialogs making up the recipe conversation.
//! Each submodule exposes its ordered steps; [`register_all`] binds them to
//! their [`DialogId`].

pub mod allergies;
pub mod choose_recipe;
pub mod cooking;
pub mod ingredients;
pub mod root;
pub mod welcome;

use crate::state::{DialogId, DialogRegistry};

/// Register every built-in dialog
pub fn register_all(registry: &mut DialogRegistry) {
    registry
        .register(DialogId::Root, root::steps())
        .register(DialogId::WelcomeNewUser, welcome::steps())
        .register(DialogId::Allergies, allergies::steps())
        .register(DialogId::ProvideIngredients, ingredients::steps())
        .register(DialogId::ChooseRecipe, choose_recipe::steps())
        .register(DialogId::Cooking, cooking::steps());
}
