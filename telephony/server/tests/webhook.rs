use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use dialogue_adapters::{DirectiveTransfer, LogNotifier, Notifier, RouterClassifier};
use dialogue_core::ports::SessionStore;
use dialogue_core::{DialogueEngine, PolicyConfig};
use protocol::{Control, TurnReply};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use voice_server::config::SpeechSettings;
use voice_server::{app, AppState};

fn state() -> AppState {
    let mut policy = PolicyConfig::default().with_operator("+33100000000");
    policy.prompts.business_name = "Cabinet Aliwa".into();
    let engine = DialogueEngine::in_memory(
        policy,
        RouterClassifier::keywords_only(),
        Notifier::Log(LogNotifier),
        DirectiveTransfer::new(),
    );
    AppState { engine: Arc::new(engine), speech: SpeechSettings::default() }
}

async fn post_form(router: &Router, body: &str) -> (StatusCode, String) {
    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/voice")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn first_hit_greets_and_gathers() {
    let router = app(state());
    let (status, xml) = post_form(&router, "CallSid=CA1&From=%2B33600000000").await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("Cabinet Aliwa"));
    assert!(xml.contains(r#"<Gather input="speech""#));
    assert!(xml.contains(r#"voice="Polly.Celine""#));
}

#[tokio::test]
async fn silence_after_greeting_counts_as_retry() {
    let state = state();
    let router = app(state.clone());
    post_form(&router, "CallSid=CA2").await;
    let (_, xml) = post_form(&router, "CallSid=CA2").await;
    assert!(xml.contains("repeat"));
    let session = state.engine.store().get("CA2").await.unwrap().unwrap();
    assert_eq!(session.retry_count, 1);
}

#[tokio::test]
async fn goodbye_hangs_up_and_forgets_call() {
    let state = state();
    let router = app(state.clone());
    post_form(&router, "CallSid=CA3").await;
    let (_, xml) = post_form(&router, "CallSid=CA3&SpeechResult=Merci%2C+au+revoir").await;
    assert!(xml.contains("<Hangup/>"));
    assert!(state.engine.store().get("CA3").await.unwrap().is_none());
}

#[tokio::test]
async fn transfer_request_dials_operator() {
    let router = app(state());
    let (_, xml) = post_form(&router, "CallSid=CA4&SpeechResult=I+want+to+speak+to+a+real+person").await;
    assert!(xml.contains("<Dial>+33100000000</Dial>"));
}

#[tokio::test]
async fn missing_call_sid_is_rejected() {
    let router = app(state());
    let (status, _) = post_form(&router, "SpeechResult=hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn json_turn_endpoint() {
    let router = app(state());
    let resp = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/turn")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"call_id":"CA5","utterance":"what are your opening hours?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let reply: TurnReply = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply.control, Control::ContinueListening);
    assert!(reply.prompt.contains("Monday to Friday"));
}

#[tokio::test]
async fn health_reports_live_sessions() {
    let state = state();
    let router = app(state.clone());
    post_form(&router, "CallSid=CA6").await;

    let resp = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["sessions"], 1);
}

#[tokio::test]
async fn json_turn_without_call_id_is_bad_request() {
    let router = app(state());
    let resp = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/turn")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"call_id":"  ","utterance":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid input"));
}
