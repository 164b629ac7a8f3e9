//! Cooking flow: ingredients in, recipes out, preferences recorded

use futures::future::BoxFuture;
use tracing::{info, warn};

use super::choose_recipe;
use crate::models::{render_recipe_text, Preference};
use crate::state::{
    DialogId, DialogValues, Step, StepInput, Transition, TurnContext, ValueKey,
};
use crate::utils::errors::Result;

pub const NO_RECIPES: &str =
    "I'm sorry, I couldn't come up with any recipes for those ingredients. Please try again later.";
pub const RECIPES_INTRO: &str = "Here are some recipes you could make:";
pub const PREFERENCES_SAVED: &str = "Thanks! I've saved your recipe preferences for next time.";
pub const ENJOY: &str = "Enjoy your cooking!";

pub fn steps() -> Vec<Step> {
    let steps: [Step; 3] = [gather_ingredients, offer_recipes, record_preferences];
    steps.to_vec()
}

fn gather_ingredients<'a>(
    _ctx: &'a mut TurnContext,
    _values: &'a mut DialogValues,
    _input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        Ok(Transition::BeginDialog(
            DialogId::ProvideIngredients,
            DialogValues::new(),
        ))
    })
}

fn offer_recipes<'a>(
    ctx: &'a mut TurnContext,
    values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let ingredients: Vec<String> = input.decode()?.unwrap_or_default();

        let recipes = match ctx.services.generator.generate(&ingredients).await {
            Ok(recipes) => recipes,
            Err(e) => {
                warn!(error = %e, "Recipe generation failed");
                Vec::new()
            }
        };

        if recipes.is_empty() {
            ctx.send(NO_RECIPES);
            return Ok(Transition::end());
        }

        info!(ingredients = ?ingredients, recipes = recipes.len(), "Generated recipes");
        ctx.send(RECIPES_INTRO);
        for (index, recipe) in recipes.iter().enumerate() {
            ctx.send(format!(
                "{}\n\n{}",
                choose_recipe::recipe_label(index),
                render_recipe_text(recipe)
            ));
        }

        values.set(ValueKey::Ingredients, &ingredients)?;
        values.set(ValueKey::Recipes, &recipes)?;
        Ok(Transition::BeginDialog(
            DialogId::ChooseRecipe,
            choose_recipe::options(&recipes, &[])?,
        ))
    })
}

fn record_preferences<'a>(
    ctx: &'a mut TurnContext,
    values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let selected: Vec<usize> = input.decode()?.unwrap_or_default();
        let recipes: Vec<String> = values.get_or_default(ValueKey::Recipes)?;

        let preferences: Vec<Preference> = recipes
            .into_iter()
            .enumerate()
            .map(|(index, recipe)| Preference {
                recipe,
                marked_as_preference: selected.contains(&index),
            })
            .collect();

        if ctx.user.tracking_allowed() {
            let stored = ctx
                .services
                .repository
                .add_preferences(&ctx.user_id, &preferences)
                .await;
            match stored {
                Ok(()) if !selected.is_empty() => ctx.send(PREFERENCES_SAVED),
                Ok(()) => {}
                Err(e) => warn!(user_id = %ctx.user_id, error = %e, "Failed to store preferences"),
            }
        }

        ctx.send(ENJOY);
        Ok(Transition::end())
    })
}
