//! Ingredient capture
//!
//! Accepts a photo or a typed list, turns it into ingredient terms, drops
//! anything the user is allergic to and asks the user to confirm the rest.

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::state::{
    DialogId, DialogValues, PromptSpec, RecognizedValue, Step, StepInput, Transition,
    TurnContext, ValueKey,
};
use crate::utils::errors::Result;
use crate::utils::helpers::{format_list, normalize_term};

pub const INGREDIENTS_PROMPT: &str =
    "Please provide the ingredients you have on hand. This can be as text or in a photo.";
pub const INGREDIENTS_RETRY: &str = "The attachment must be a jpeg/png image file.";
pub const NOT_UNDERSTOOD: &str =
    "I'm sorry I couldn't understand those ingredients, may you please try again?";
pub const REJECTED: &str = "I'm sorry about that, please try again with a different input.";
pub const ACCEPTED: &str = "Thank you";

pub fn steps() -> Vec<Step> {
    let steps: [Step; 3] = [ask_ingredients, confirm_ingredients, finish];
    steps.to_vec()
}

/// Split terms into those safe to use and those matching an allergy
pub fn filter_allergies(terms: Vec<String>, allergies: &[String]) -> (Vec<String>, Vec<String>) {
    let allergies: Vec<String> = allergies.iter().map(|a| normalize_term(a)).collect();
    terms
        .into_iter()
        .partition(|term| !allergies.contains(&normalize_term(term)))
}

fn ask_ingredients<'a>(
    ctx: &'a mut TurnContext,
    _values: &'a mut DialogValues,
    _input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let spec = PromptSpec::attachment(INGREDIENTS_PROMPT, ctx.config.image_content_types.clone())
            .with_retry(INGREDIENTS_RETRY)
            .accepting_text();
        Ok(Transition::Prompt(spec))
    })
}

/// Terms understood from the recognized input; capability failures count
/// as nothing understood
async fn understand(ctx: &TurnContext, input: StepInput) -> Vec<String> {
    match input {
        StepInput::Recognized(RecognizedValue::Text(text)) => {
            match ctx.services.extractor.extract_terms(&[text]).await {
                Ok(terms) => terms.unwrap_or_default(),
                Err(e) => {
                    warn!(error = %e, "Ingredient extraction failed");
                    Vec::new()
                }
            }
        }
        StepInput::Recognized(RecognizedValue::Attachments(attachments)) => {
            match ctx.services.detector.detect_objects(&attachments).await {
                Ok(terms) => terms,
                Err(e) => {
                    warn!(error = %e, "Object detection failed");
                    Vec::new()
                }
            }
        }
        other => {
            debug!(input = ?other, "Unexpected ingredient input");
            Vec::new()
        }
    }
}

fn confirm_ingredients<'a>(
    ctx: &'a mut TurnContext,
    values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let terms = understand(ctx, input).await;
        if terms.is_empty() {
            ctx.send(NOT_UNDERSTOOD);
            return Ok(Transition::ReplaceDialog(DialogId::ProvideIngredients, DialogValues::new()));
        }

        let (ingredients, filtered) = filter_allergies(terms, ctx.user.allergies());
        let notice = (!filtered.is_empty()).then(|| {
            format!(
                "Please note I have filtered out {} because you have previously said you are allergic.",
                format_list(&filtered)
            )
        });

        if ingredients.is_empty() {
            if let Some(notice) = notice {
                ctx.send(notice);
            }
            ctx.send(REJECTED);
            return Ok(Transition::ReplaceDialog(DialogId::ProvideIngredients, DialogValues::new()));
        }

        let mut message = format!(
            "From what I understood you currently have {} on hand?",
            format_list(&ingredients)
        );
        if let Some(notice) = notice {
            message.push(' ');
            message.push_str(&notice);
        }

        values.set(ValueKey::Ingredients, &ingredients)?;
        Ok(Transition::Prompt(PromptSpec::confirm(message)))
    })
}

fn finish<'a>(
    ctx: &'a mut TurnContext,
    values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        if input.as_confirm().unwrap_or(false) {
            ctx.send(ACCEPTED);
            let ingredients: Vec<String> = values.get_or_default(ValueKey::Ingredients)?;
            Transition::end_with(ingredients)
        } else {
            ctx.send(REJECTED);
            Ok(Transition::ReplaceDialog(DialogId::ProvideIngredients, DialogValues::new()))
        }
    })
}
