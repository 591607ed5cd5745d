pub mod config;
pub mod twiml;

use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Form, Json},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use dialogue_adapters::{DirectiveTransfer, HttpNotifier, LogNotifier, Notifier, RouterClassifier};
use dialogue_core::ports::SessionStore;
use dialogue_core::{DialogueEngine, DialogueError, PromptKey};
use protocol::{TurnInput, TurnReply};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use config::{LlmChoice, ServerConfig, SpeechSettings};

pub type VoiceEngine = DialogueEngine<RouterClassifier, Notifier, DirectiveTransfer>;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VoiceEngine>,
    pub speech: SpeechSettings,
}

/// Wires the production ports from configuration.
pub fn build_engine(config: &ServerConfig) -> Result<VoiceEngine> {
    // Leave the keyword fallback room to answer inside the engine's own bound.
    let primary_timeout = config.policy.classifier_timeout() * 3 / 4;
    let classifier = match config.llm_provider {
        LlmChoice::None => RouterClassifier::keywords_only(),
        LlmChoice::Groq => RouterClassifier::llm(
            llm::Client::from_env(llm::Provider::Groq, &config.llm_model).context("building Groq client")?,
            primary_timeout,
        ),
        LlmChoice::OpenAi => RouterClassifier::llm(
            llm::Client::from_env(llm::Provider::OpenAi, &config.llm_model).context("building OpenAI client")?,
            primary_timeout,
        ),
    }
    .with_min_confidence(config.llm_min_confidence);

    let notifier = match &config.notify_webhook_url {
        Some(url) => {
            let mut http = HttpNotifier::new(url.clone());
            if let Some(to) = &config.notify_recipient {
                http = http.with_recipient(to.clone());
            }
            if let Some(token) = &config.notify_token {
                http = http.with_bearer(token.clone());
            }
            Notifier::Http(http)
        }
        None => Notifier::Log(LogNotifier),
    };

    info!(classifier = classifier.primary_name(), notifier = %notifier.describe(), "dialogue engine wired");
    Ok(DialogueEngine::in_memory(config.policy.clone(), classifier, notifier, DirectiveTransfer::new()))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/voice", post(voice))
        .route("/turn", post(turn))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

/// Fields of the platform's form post that the dialogue needs.
#[derive(Debug, Deserialize)]
pub struct VoiceForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: Option<String>,
}

async fn voice(Extension(state): Extension<AppState>, Form(form): Form<VoiceForm>) -> Response {
    if form.call_sid.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "missing CallSid").into_response();
    }

    let result = match form.speech_result {
        Some(speech) => state.engine.handle_turn(TurnInput::new(form.call_sid.as_str(), speech)).await,
        None => match state.engine.store().get(&form.call_sid).await {
            Ok(Some(_)) => state.engine.handle_turn(TurnInput::new(form.call_sid.as_str(), "")).await,
            Ok(None) => state.engine.start_call(&form.call_sid).await,
            Err(e) => Err(DialogueError::Store(format!("{:#}", e))),
        },
    };

    let reply = result.unwrap_or_else(|e| {
        error!(call_id = %form.call_sid, error = %e, "turn failed, hanging up");
        TurnReply::end(state.engine.config().prompts.render(PromptKey::SystemError))
    });

    ([(header::CONTENT_TYPE, twiml::CONTENT_TYPE)], twiml::render(&reply, &state.speech)).into_response()
}

async fn turn(Extension(state): Extension<AppState>, Json(input): Json<TurnInput>) -> Response {
    match state.engine.handle_turn(input).await {
        Ok(reply) => (StatusCode::OK, Json(json!(reply))).into_response(),
        Err(e @ DialogueError::InvalidInput(_)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "turn failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn health_check(Extension(state): Extension<AppState>) -> impl IntoResponse {
    match state.engine.store().len().await {
        Ok(sessions) => (StatusCode::OK, Json(json!({ "ok": true, "sessions": sessions }))),
        Err(e) => {
            warn!(error = %e, "health check could not read the session store");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "ok": false })))
        }
    }
}

/// Idle-session sweeper for the engine's store; drop or signal the returned
/// sender to stop it.
pub fn spawn_sweeper(engine: &VoiceEngine, config: &ServerConfig) -> tokio::sync::watch::Sender<bool> {
    dialogue_core::spawn_idle_sweeper(
        engine.store().clone(),
        config.session_idle,
        Duration::from_secs(config.sweep_interval_secs.max(1)),
    )
}
