//! Capability client tests against a mock HTTP server

mod helpers;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, ResponseTemplate,
};

use helpers::service_mock::{ServiceMockServer, RECIPES_KEY, SUBSCRIPTION_KEY};
use helpers::strings;
use RecipeBuddy::models::{Attachment, Preference, UserRecord};
use RecipeBuddy::services::{
    IngredientExtractor, ObjectDetector, RecipeGenerator, RecipeGeneratorClient,
    RepositoryClient, TextAnalyticsClient, UserRepository, VisionClient,
};
use RecipeBuddy::utils::errors::CapabilityError;

const KEY_PHRASES: &str = "/text/analytics/v3.1/keyPhrases";
const DETECT: &str = "/vision/v3.2/detect";

#[tokio::test]
async fn test_key_phrases_are_ordered_normalized_and_deduplicated() {
    let mock = ServiceMockServer::new().await;
    Mock::given(method("POST"))
        .and(path(KEY_PHRASES))
        .and(header("Ocp-Apim-Subscription-Key", SUBSCRIPTION_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                { "id": "2", "keyPhrases": ["Rice"] },
                { "id": "1", "keyPhrases": ["Chicken breast", "rice", " "] }
            ],
            "errors": [{ "id": "3", "error": { "code": "InvalidDocument" } }]
        })))
        .mount(&mock.server)
        .await;

    let client = TextAnalyticsClient::new(&mock.cognitive_config()).unwrap();
    let texts = strings(&["chicken breast and rice", "rice", "???"]);
    let terms = client.extract_terms(&texts).await.unwrap();
    assert_eq!(terms, Some(strings(&["chicken breast", "rice"])));

    let bodies = mock.request_bodies(KEY_PHRASES).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0]["documents"][0],
        json!({ "id": "1", "language": "en", "text": "chicken breast and rice" })
    );
    assert_eq!(bodies[0]["documents"][2]["id"], "3");
}

#[tokio::test]
async fn test_nothing_understood_is_none() {
    let mock = ServiceMockServer::new().await;
    mock.mock_json("POST", KEY_PHRASES, 200, json!({ "documents": [{ "id": "1", "keyPhrases": [] }] }))
        .await;

    let client = TextAnalyticsClient::new(&mock.cognitive_config()).unwrap();
    assert_eq!(client.extract_terms(&strings(&["hmm"])).await.unwrap(), None);
}

#[tokio::test]
async fn test_blank_text_skips_the_request() {
    let mock = ServiceMockServer::new().await;
    let client = TextAnalyticsClient::new(&mock.cognitive_config()).unwrap();

    assert_eq!(client.extract_terms(&strings(&["  ", ""])).await.unwrap(), None);
    assert!(mock.request_bodies(KEY_PHRASES).await.is_empty());
}

#[tokio::test]
async fn test_text_analytics_failures_are_errors() {
    let mock = ServiceMockServer::new().await;
    mock.mock_status("POST", KEY_PHRASES, 503).await;
    let client = TextAnalyticsClient::new(&mock.cognitive_config()).unwrap();

    let result = client.extract_terms(&strings(&["rice"])).await;
    assert_matches!(
        result,
        Err(CapabilityError::ServiceUnavailable { service: "text_analytics" })
    );
}

#[tokio::test]
async fn test_detected_objects_are_filtered_by_confidence() {
    let mock = ServiceMockServer::new().await;
    mock.mock_json(
        "POST",
        DETECT,
        200,
        json!({
            "objects": [
                { "object": "Tomato", "confidence": 0.91 },
                { "object": "egg", "confidence": 0.2 },
                { "object": "tomato", "confidence": 0.7 }
            ]
        }),
    )
    .await;

    let client = VisionClient::new(&mock.cognitive_config()).unwrap();
    let attachments = vec![
        Attachment::new("image/png", "https://files.example.com/a.png"),
        Attachment::new("image/jpeg", "https://files.example.com/b.jpg"),
    ];
    let objects = client.detect_objects(&attachments).await.unwrap();
    assert_eq!(objects, strings(&["tomato"]));

    let bodies = mock.request_bodies(DETECT).await;
    assert_eq!(
        bodies,
        vec![
            json!({ "url": "https://files.example.com/a.png" }),
            json!({ "url": "https://files.example.com/b.jpg" }),
        ]
    );
}

#[tokio::test]
async fn test_downloaded_content_is_uploaded_as_octet_stream() {
    const BOT_TOKEN: &str = "123456:telegram-bot-token";
    let mock = ServiceMockServer::new().await;
    Mock::given(method("POST"))
        .and(path(DETECT))
        .and(header("content-type", "application/octet-stream"))
        .and(header("Ocp-Apim-Subscription-Key", SUBSCRIPTION_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [{ "object": "Carrot", "confidence": 0.88 }]
        })))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = VisionClient::new(&mock.cognitive_config()).unwrap();
    let photo = Attachment::new("image/jpeg", "telegram:AgACAgIAAxkBAAI").with_data(vec![0xff, 0xd8, 0xff, 0xe0]);
    let objects = client.detect_objects(&[photo]).await.unwrap();
    assert_eq!(objects, strings(&["carrot"]));

    let bodies = mock.raw_request_bodies(DETECT).await;
    assert_eq!(bodies, vec![vec![0xff, 0xd8, 0xff, 0xe0]]);
    for body in &bodies {
        let text = String::from_utf8_lossy(body);
        assert!(!text.contains(BOT_TOKEN));
        assert!(!text.contains("/file/bot"));
    }
}

#[tokio::test]
async fn test_vision_error_status_is_reported() {
    let mock = ServiceMockServer::new().await;
    mock.mock_json("POST", DETECT, 400, json!({ "error": "bad image" })).await;

    let client = VisionClient::new(&mock.cognitive_config()).unwrap();
    let result = client
        .detect_objects(&[Attachment::new("image/png", "https://files.example.com/a.png")])
        .await;
    assert_matches!(result, Err(CapabilityError::RequestFailed { service: "vision", reason }) => {
        assert!(reason.starts_with("HTTP 400"));
    });
}

#[tokio::test]
async fn test_recipes_are_trimmed_to_the_configured_maximum() {
    let mock = ServiceMockServer::new().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(header("x-api-key", RECIPES_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recipes": ["title: A", "   ", "title: B", "title: C"]
        })))
        .mount(&mock.server)
        .await;

    let client = RecipeGeneratorClient::new(&mock.recipes_config(2)).unwrap();
    let recipes = client.generate(&strings(&["rice", "egg"])).await.unwrap();
    assert_eq!(recipes, strings(&["title: A", "title: B"]));
    assert_eq!(
        mock.request_bodies("/generate").await,
        vec![json!({ "ingredients": ["rice", "egg"] })]
    );
}

#[tokio::test]
async fn test_repository_user_lookup() {
    let mock = ServiceMockServer::new().await;
    mock.mock_json("GET", "/api/users/user-1", 200, json!([{ "id": "user-1", "name": "Alice" }]))
        .await;
    mock.mock_status("GET", "/api/users/user-2", 404).await;
    mock.mock_json("GET", "/api/users/user-3", 200, json!([])).await;

    let client = RepositoryClient::new(&mock.repository_config()).unwrap();
    assert_eq!(
        client.get_user("user-1").await.unwrap(),
        Some(UserRecord {
            id: "user-1".to_string(),
            name: "Alice".to_string(),
        })
    );
    assert_eq!(client.get_user("user-2").await.unwrap(), None);
    assert_eq!(client.get_user("user-3").await.unwrap(), None);
}

#[tokio::test]
async fn test_repository_allergies() {
    let mock = ServiceMockServer::new().await;
    mock.mock_json(
        "GET",
        "/api/users/user-1/allergies",
        200,
        json!([
            { "userId": "user-1", "allergy": "peanuts" },
            { "userId": "user-1", "allergy": "shellfish" }
        ]),
    )
    .await;
    mock.mock_status("POST", "/api/allergies", 201).await;

    let client = RepositoryClient::new(&mock.repository_config()).unwrap();
    assert_eq!(
        client.get_allergies("user-1").await.unwrap(),
        strings(&["peanuts", "shellfish"])
    );

    client
        .add_allergies("user-1", &strings(&["kiwi"]))
        .await
        .unwrap();
    assert_eq!(
        mock.request_bodies("/api/allergies").await,
        vec![json!([{ "userId": "user-1", "allergy": "kiwi" }])]
    );
}

#[tokio::test]
async fn test_repository_writes() {
    let mock = ServiceMockServer::new().await;
    mock.mock_status("POST", "/api/preferences", 200).await;
    mock.mock_status("POST", "/api/users", 500).await;

    let client = RepositoryClient::new(&mock.repository_config()).unwrap();
    let preferences = vec![
        Preference {
            recipe: "title: A".to_string(),
            marked_as_preference: true,
        },
        Preference {
            recipe: "title: B".to_string(),
            marked_as_preference: false,
        },
    ];
    client.add_preferences("user-1", &preferences).await.unwrap();
    assert_eq!(
        mock.request_bodies("/api/preferences").await,
        vec![json!([
            { "userId": "user-1", "recipe": "title: A", "markedAsPreference": true },
            { "userId": "user-1", "recipe": "title: B", "markedAsPreference": false }
        ])]
    );

    let result = client.upsert_user("user-1", "Alice").await;
    assert_matches!(result, Err(CapabilityError::RequestFailed { service: "repository", .. }));
}
