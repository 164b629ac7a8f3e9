//! Welcome flow for users the repository does not know yet
//!
//! Asks for tracking consent, optionally captures allergies, and marks the
//! conversation as welcomed.

use futures::future::BoxFuture;
use tracing::warn;

use crate::state::{
    DialogId, DialogValues, PromptSpec, Step, StepInput, Transition, TurnContext,
};
use crate::utils::errors::Result;

pub const CONSENT_INTRO: &str = "Before we get started, please answer the following question...";
pub const CONSENT_QUESTION: &str = "Do you consent to your name, allergies, and recipe \
     preferences being tracked? This will help tailor your experiences in the future.";
pub const ALLERGY_QUESTION: &str = "Do you have any food allergies?";
pub const CLOSING: &str = "Thank you for providing this information. Now it's time to generate \
     some delicious recipes!";

pub fn steps() -> Vec<Step> {
    let steps: [Step; 4] = [ask_consent, record_consent, route_allergies, summarize];
    steps.to_vec()
}

fn ask_consent<'a>(
    ctx: &'a mut TurnContext,
    _values: &'a mut DialogValues,
    _input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        ctx.send(CONSENT_INTRO);
        Ok(Transition::Prompt(PromptSpec::confirm(CONSENT_QUESTION)))
    })
}

fn record_consent<'a>(
    ctx: &'a mut TurnContext,
    _values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let consent = input.as_confirm().unwrap_or(false);
        ctx.user.allow_tracking = Some(consent);
        let name = ctx.display_name();

        if consent {
            if let Err(e) = ctx.services.repository.upsert_user(&ctx.user_id, &name).await {
                warn!(user_id = %ctx.user_id, error = %e, "Failed to store user");
            }
            ctx.send(format!("Okay {}, your preferences will be tracked for future use!", name));
        } else {
            ctx.send(format!(
                "Okay {}, your preferences will not be tracked beyond this conversation.",
                name
            ));
        }

        Ok(Transition::Prompt(PromptSpec::confirm(ALLERGY_QUESTION)))
    })
}

fn route_allergies<'a>(
    _ctx: &'a mut TurnContext,
    _values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        if input.as_confirm().unwrap_or(false) {
            Ok(Transition::BeginDialog(DialogId::Allergies, DialogValues::new()))
        } else {
            Ok(Transition::next())
        }
    })
}

fn summarize<'a>(
    ctx: &'a mut TurnContext,
    _values: &'a mut DialogValues,
    input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        let allergies: Vec<String> = input.decode()?.unwrap_or_default();

        if !allergies.is_empty() && ctx.user.tracking_allowed() {
            if let Err(e) = ctx
                .services
                .repository
                .add_allergies(&ctx.user_id, &allergies)
                .await
            {
                warn!(user_id = %ctx.user_id, error = %e, "Failed to store allergies");
            }
        }

        ctx.user.allergies = Some(allergies);
        ctx.conversation.did_welcome = true;
        ctx.send(CLOSING);
        Ok(Transition::end())
    })
}
