//! Recipe preference selection
//!
//! Offers every not-yet-selected recipe plus `Done`, looping on itself until
//! the user is done or has selected everything. Ends with the selected
//! recipe indexes.

use futures::future::BoxFuture;

use crate::state::{
    DialogId, DialogValues, PromptSpec, Step, StepInput, Transition, TurnContext, ValueKey,
};
use crate::utils::errors::Result;

pub const DONE_OPTION: &str = "Done";
pub const CHOICE_RETRY: &str = "Please choose an option from the list.";

pub fn steps() -> Vec<Step> {
    let steps: [Step; 2] = [offer_recipes, record_choice];
    steps.to_vec()
}

/// Label shown for the recipe at `index`
pub fn recipe_label(index: usize) -> String {
    format!("Recipe {}", index + 1)
}

/// Options for a fresh selection round
pub fn options(recipes: &[String], selected: &[usize]) -> Result<DialogValues> {
    DialogValues::new()
        .with(ValueKey::Recipes, recipes)?
        .with(ValueKey::RecipesSelected, selected)
}

fn offer_recipes<'a>(
    _ctx: &'a mut TurnContext,
    values: &'a mut DialogValues,
    _input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let recipes: Vec<String> = values.get_or_default(ValueKey::Recipes)?;
        let selected: Vec<usize> = values.get_or_default(ValueKey::RecipesSelected)?;

        if selected.len() >= recipes.len() {
            let all: Vec<usize> = (0..recipes.len()).collect();
            return Transition::end_with(all);
        }

        let message = match selected.last() {
            None => format!(
                "Please choose a recipe to mark as your preference, or `{}` to finish. \
                 This will be added to your preferences.",
                DONE_OPTION
            ),
            Some(last) => format!(
                "You have selected **{}**. You can review an additional recipe, or choose `{}` to finish.",
                recipe_label(*last),
                DONE_OPTION
            ),
        };

        let mut choices: Vec<String> = (0..recipes.len())
            .filter(|index| !selected.contains(index))
            .map(recipe_label)
            .collect();
        choices.push(DONE_OPTION.to_string());

        Ok(Transition::Prompt(
            PromptSpec::choice(message, choices).with_retry(CHOICE_RETRY),
        ))
    })
}

fn record_choice<'a>(
    _ctx: &'a mut TurnContext,
    values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let recipes: Vec<String> = values.get_or_default(ValueKey::Recipes)?;
        let mut selected: Vec<usize> = values.get_or_default(ValueKey::RecipesSelected)?;
        let choice = input.as_text().unwrap_or(DONE_OPTION);

        if choice == DONE_OPTION {
            return Transition::end_with(selected);
        }

        if let Some(index) = (0..recipes.len()).find(|index| recipe_label(*index) == choice) {
            if !selected.contains(&index) {
                selected.push(index);
            }
        }

        Ok(Transition::ReplaceDialog(
            DialogId::ChooseRecipe,
            options(&recipes, &selected)?,
        ))
    })
}
