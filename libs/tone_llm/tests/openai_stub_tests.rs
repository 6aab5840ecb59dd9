use std::time::Duration;

use serde_json::{json, Value};
use tone_llm::{
    modify_text_via, Feature, ModelSettings, ModifyError, OpenAIConnector, NO_RESPONSE_FALLBACK,
};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn completion(choices: Value) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4",
        "choices": choices
    })
}

fn api_error(message: &str, code: &str) -> Value {
    json!({
        "error": {
            "message": message,
            "type": "invalid_request_error",
            "param": null,
            "code": code
        }
    })
}

async fn stub_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

async fn modify_against(server: &MockServer) -> Result<String, ModifyError> {
    let connector = OpenAIConnector::new(Some(server.uri()));
    let features = vec![Feature::new("Clarity", 90), Feature::new("Simplicity", 40)];

    tokio::time::timeout(
        Duration::from_secs(5),
        modify_text_via(
            &connector,
            "hello there",
            &features,
            "sk-test",
            &ModelSettings::default(),
        ),
    )
    .await
    .expect("completion call should return promptly")
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

#[tokio::test]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!([
            {
                "index": 0,
                "message": { "role": "assistant", "content": "Hi!" },
                "finish_reason": "stop",
                "logprobs": null
            },
            {
                "index": 1,
                "message": { "role": "assistant", "content": "Hello!" },
                "finish_reason": "stop",
                "logprobs": null
            }
        ]))))
        .mount(&server)
        .await;

    let result = modify_against(&server).await;

    assert_eq!(result, Ok("Hi!".to_string()));
    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "gpt-4");
    let temperature = bodies[0]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
    let messages = bodies[0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    assert!(messages[0]["content"]
        .as_str()
        .unwrap()
        .contains("Clarity: 90%, Simplicity: 40%"));
}

#[tokio::test]
async fn empty_choices_fall_back() {
    let server =
        stub_server(ResponseTemplate::new(200).set_body_json(completion(json!([])))).await;

    let result = modify_against(&server).await;

    assert_eq!(result, Ok(NO_RESPONSE_FALLBACK.to_string()));
}

#[tokio::test]
async fn unauthorized_message_is_passed_through() {
    let server = stub_server(
        ResponseTemplate::new(401)
            .set_body_json(api_error("Incorrect API key provided", "invalid_api_key")),
    )
    .await;

    let error = modify_against(&server).await.unwrap_err();

    assert_eq!(error.message(), "Incorrect API key provided");
    assert_eq!(request_bodies(&server).await.len(), 1);
}

#[tokio::test]
async fn rate_limited_call_is_not_retried() {
    let server = stub_server(
        ResponseTemplate::new(429).set_body_json(api_error("Rate limit reached", "rate_limit_exceeded")),
    )
    .await;

    let error = modify_against(&server).await.unwrap_err();

    assert_eq!(
        error,
        ModifyError::Failed {
            message: "Rate limit reached".to_string()
        }
    );
    assert_eq!(request_bodies(&server).await.len(), 1);
}
