//! Top-level dialog started for idle conversations
//!
//! Identifies the user and hands over to either the welcome flow or the
//! cooking flow.

use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::state::{DialogId, DialogValues, Step, StepInput, Transition, TurnContext};
use crate::utils::errors::Result;

pub fn greeting(name: &str) -> String {
    format!(
        "Hi there {}. Welcome to RecipeBot, where you can provide your ingredients and receive \
         a tailored recipe. Let's help reduce food waste together!",
        name
    )
}

pub fn welcome_back(name: &str) -> String {
    format!("Welcome back {}!", name)
}

pub fn steps() -> Vec<Step> {
    let steps: [Step; 1] = [identify_user];
    steps.to_vec()
}

fn identify_user<'a>(
    ctx: &'a mut TurnContext,
    _values: &'a mut DialogValues,
    _input: StepInput,
) -> BoxFuture<'a, Result<Transition>> {
    Box::pin(async move {
        ctx.user.id = Some(ctx.user_id.clone());
        if ctx.user.name.is_none() {
            ctx.user.name = ctx.user_name.clone();
        }

        if ctx.conversation.did_welcome {
            return Ok(Transition::ReplaceDialog(DialogId::Cooking, DialogValues::new()));
        }

        let name = ctx.display_name();
        ctx.send(greeting(&name));

        let repository = ctx.services.repository.clone();
        let known = match repository.get_user(&ctx.user_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(user_id = %ctx.user_id, error = %e, "User lookup failed, treating as new user");
                None
            }
        };

        let Some(record) = known else {
            info!(user_id = %ctx.user_id, "New user, starting welcome");
            return Ok(Transition::ReplaceDialog(DialogId::WelcomeNewUser, DialogValues::new()));
        };

        info!(user_id = %ctx.user_id, "Returning user");
        ctx.user.name = Some(record.name);
        ctx.user.allow_tracking = Some(true);
        match repository.get_allergies(&ctx.user_id).await {
            Ok(allergies) => ctx.user.allergies = Some(allergies),
            Err(e) => warn!(user_id = %ctx.user_id, error = %e, "Failed to restore allergies"),
        }
        ctx.conversation.did_welcome = true;

        let name = ctx.display_name();
        ctx.send(welcome_back(&name));
        Ok(Transition::ReplaceDialog(DialogId::Cooking, DialogValues::new()))
    })
}
