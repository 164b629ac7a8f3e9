//! Allergy capture

use futures::future::BoxFuture;

use crate::state::{
    DialogId, DialogValues, PromptSpec, Step, StepInput, Transition, TurnContext, ValueKey,
};
use crate::utils::errors::Result;
use crate::utils::helpers::{format_list, split_list};

pub const ALLERGY_PROMPT: &str = "Please provide the foods you are allergic to.";

pub fn steps() -> Vec<Step> {
    let steps: [Step; 3] = [ask_allergies, confirm_allergies, finish];
    steps.to_vec()
}

fn ask_allergies<'a>(
    _ctx: &'a mut TurnContext,
    _values: &'a mut DialogValues,
    _input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move { Ok(Transition::Prompt(PromptSpec::text(ALLERGY_PROMPT))) })
}

fn confirm_allergies<'a>(
    ctx: &'a mut TurnContext,
    values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let allergies = split_list(input.as_text().unwrap_or_default());
        if allergies.is_empty() {
            ctx.send("I didn't catch any foods there, let's try that again.");
            return Ok(Transition::ReplaceDialog(DialogId::Allergies, DialogValues::new()));
        }

        let message = format!(
            "From what I understood your allergies are {}. Is this correct?",
            format_list(&allergies)
        );
        values.set(ValueKey::Allergies, &allergies)?;
        Ok(Transition::Prompt(PromptSpec::confirm(message)))
    })
}

fn finish<'a>(
    _ctx: &'a mut TurnContext,
    values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        if input.as_confirm().unwrap_or(false) {
            let allergies: Vec<String> = values.get_or_default(ValueKey::Allergies)?;
            Transition::end_with(allergies)
        } else {
            Ok(Transition::ReplaceDialog(DialogId::Allergies, DialogValues::new()))
        }
    })
}
