//! Dialog engine integrity tests
//!
//! Failure paths of turn processing: corrupt persisted stacks, failing
//! writes, serialization of concurrent turns and conversation resets.

mod helpers;

use assert_matches::assert_matches;
use std::sync::Arc;

use helpers::*;
use RecipeBuddy::config::EngineConfig;
use RecipeBuddy::dialogs::root::greeting;
use RecipeBuddy::dialogs::welcome::CONSENT_QUESTION;
use RecipeBuddy::models::Turn;
use RecipeBuddy::services::Services;
use RecipeBuddy::state::{
    DialogEngine, DialogId, DialogInstance, DialogRegistry, DialogStack, DialogValues,
    PromptSpec, ScopeKey, StateStorage, StateStore,
};
use RecipeBuddy::utils::errors::RecipeBuddyError;

fn stack_key(ctx: &TestContext) -> String {
    ctx.storage.key(&ScopeKey::Stack(CONVERSATION_ID.to_string()))
}

#[tokio::test]
async fn test_undecodable_stack_is_fatal() {
    let ctx = TestContext::new();
    ctx.store
        .save(&stack_key(&ctx), "{not json".to_string())
        .await
        .unwrap();

    let result = ctx
        .engine
        .process_turn(&Turn::text(CONVERSATION_ID, USER_ID, "hello"))
        .await;
    assert_matches!(result, Err(RecipeBuddyError::CorruptStackState { conversation_id, .. }) => {
        assert_eq!(conversation_id, CONVERSATION_ID);
    });
}

#[tokio::test]
async fn test_active_instance_without_prompt_is_fatal() {
    let ctx = TestContext::new();
    let mut stack = DialogStack::new();
    stack.push(DialogInstance::new(DialogId::Cooking, DialogValues::new()));
    ctx.storage.save_stack(CONVERSATION_ID, &stack).await.unwrap();

    let result = ctx
        .engine
        .process_turn(&Turn::text(CONVERSATION_ID, USER_ID, "hello"))
        .await;
    assert_matches!(result, Err(RecipeBuddyError::CorruptStackState { .. }));
}

#[tokio::test]
async fn test_step_index_past_dialog_end_is_fatal() {
    let ctx = TestContext::new();
    let mut instance = DialogInstance::new(DialogId::Allergies, DialogValues::new());
    instance.step_index = 7;
    instance.pending_prompt = Some(PromptSpec::text("Anything?"));
    let mut stack = DialogStack::new();
    stack.push(instance);
    ctx.storage.save_stack(CONVERSATION_ID, &stack).await.unwrap();

    let result = ctx
        .engine
        .process_turn(&Turn::text(CONVERSATION_ID, USER_ID, "peanuts"))
        .await;
    assert_matches!(
        result,
        Err(RecipeBuddyError::UnknownStep {
            dialog: DialogId::Allergies,
            step_index: 8,
        })
    );
}

fn engine_over(store: Arc<FailingStore>) -> DialogEngine {
    let services = Services::new(
        Arc::new(FakeExtractor),
        Arc::new(FakeDetector::default()),
        Arc::new(FakeGenerator::default()),
        Arc::new(RecordingRepository::new()),
    );
    DialogEngine::new(
        StateStorage::new(store, STATE_PREFIX),
        DialogRegistry::new(),
        services,
        EngineConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_failed_save_fails_the_turn() {
    let engine = engine_over(Arc::new(FailingStore::all()));

    let result = engine
        .process_turn(&Turn::presence(CONVERSATION_ID, USER_ID))
        .await;
    assert_matches!(result, Err(RecipeBuddyError::StateSave { key, .. }) => {
        assert_eq!(key, format!("{}conversation:{}", STATE_PREFIX, CONVERSATION_ID));
    });
}

#[tokio::test]
async fn test_failed_bag_save_leaves_stack_unadvanced() {
    let store = Arc::new(FailingStore::on_scope("user"));
    let engine = engine_over(store.clone());

    let result = engine
        .process_turn(&Turn::presence(CONVERSATION_ID, USER_ID))
        .await;
    assert_matches!(result, Err(RecipeBuddyError::StateSave { .. }));

    let stack_key = format!("{}stack:{}", STATE_PREFIX, CONVERSATION_ID);
    assert_eq!(store.records.load(&stack_key).await.unwrap(), None);
}

#[tokio::test]
async fn test_concurrent_turns_in_one_conversation_are_serialized() {
    let ctx = TestContext::new();
    let first = Turn::presence(CONVERSATION_ID, USER_ID).with_user_name(USER_NAME);
    let second = first.clone();

    let (a, b) = tokio::join!(
        ctx.engine.process_turn(&first),
        ctx.engine.process_turn(&second)
    );
    let mut lengths = vec![a.unwrap().len(), b.unwrap().len()];
    lengths.sort();

    // One turn starts the conversation, the other finds it suspended
    assert_eq!(lengths, vec![1, 3]);
    assert_eq!(ctx.stack().await.depth(), 1);
    assert_eq!(ctx.conversation().await.turn_count, 2);
}

#[tokio::test]
async fn test_conversations_do_not_share_state() {
    let ctx = TestContext::new();
    ctx.start().await;
    ctx.say("yes").await;

    let other = ctx
        .send(Turn::presence("conversation-2", "user-2"))
        .await;
    assert_eq!(other.last().unwrap().text, CONSENT_QUESTION);
    assert_eq!(ctx.stack().await.top().unwrap().step_index, 1);
}

#[tokio::test]
async fn test_reset_discards_conversation_but_keeps_user() {
    let ctx = TestContext::new();
    ctx.complete_welcome().await;
    ctx.say("hello").await;
    assert_eq!(ctx.stack().await.depth(), 2);

    ctx.engine.reset_conversation(CONVERSATION_ID).await.unwrap();
    assert!(ctx.stack().await.is_idle());
    assert!(!ctx.conversation().await.did_welcome);
    assert_eq!(ctx.user().await.allow_tracking, Some(true));

    let replies = ctx.start().await;
    assert_eq!(replies[0], greeting(USER_NAME));
}
