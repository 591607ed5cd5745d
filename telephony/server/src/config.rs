use anyhow::{bail, Context, Result};
use chrono::TimeDelta;
use dialogue_core::PolicyConfig;
use std::str::FromStr;

/// Which language model, if any, backs the intent classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmChoice {
    Groq,
    OpenAi,
    /// Keyword matching only.
    None,
}

impl FromStr for LlmChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(LlmChoice::Groq),
            "openai" => Ok(LlmChoice::OpenAi),
            "none" | "keyword" | "keywords" | "" => Ok(LlmChoice::None),
            other => bail!("unknown LLM_PROVIDER {:?} (expected groq, openai or none)", other),
        }
    }
}

impl LlmChoice {
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmChoice::Groq => "llama-3.1-8b-instant",
            LlmChoice::OpenAi => "gpt-4o-mini",
            LlmChoice::None => "",
        }
    }
}

/// How `<Say>` and `<Gather>` are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSettings {
    pub voice: String,
    pub language: String,
    pub gather_timeout_secs: u32,
    /// Where the platform posts the next turn.
    pub action_path: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            voice: "Polly.Celine".into(),
            language: "fr-FR".into(),
            gather_timeout_secs: 3,
            action_path: "/voice".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub policy: PolicyConfig,
    pub speech: SpeechSettings,
    /// Inactivity after which the sweeper drops a session.
    pub session_idle: TimeDelta,
    pub sweep_interval_secs: u64,
    pub llm_provider: LlmChoice,
    pub llm_model: String,
    /// Below this the keyword heuristic overrides the model.
    pub llm_min_confidence: f32,
    pub notify_webhook_url: Option<String>,
    pub notify_recipient: Option<String>,
    pub notify_token: Option<String>,
}

impl ServerConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut policy = PolicyConfig::default();
        policy.operator_number = get("OPERATOR_NUMBER").unwrap_or_default();
        if let Some(v) = get("REQUIRE_EMAIL_CAPTURE") {
            policy.require_email_capture = parse_bool("REQUIRE_EMAIL_CAPTURE", &v)?;
        }
        if let Some(v) = get("CLASSIFIER_TIMEOUT_MS") {
            policy.classifier_timeout_ms = parse("CLASSIFIER_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("ACTION_TIMEOUT_MS") {
            policy.action_timeout_ms = parse("ACTION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("MAX_RETRIES_BEFORE_TRANSFER") {
            policy.max_retries_before_transfer_offer = parse("MAX_RETRIES_BEFORE_TRANSFER", &v)?;
        }
        if let Some(v) = get("BUSINESS_NAME") {
            policy.prompts.business_name = v;
        }
        if let Some(v) = get("OPENING_HOURS") {
            policy.prompts.opening_hours = v;
        }
        if let Some(path) = get("PROMPTS_FILE") {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading PROMPTS_FILE {}", path))?;
            let business = policy.prompts.business_name.clone();
            let hours = policy.prompts.opening_hours.clone();
            policy.prompts = serde_json::from_str(&raw).with_context(|| format!("parsing PROMPTS_FILE {}", path))?;
            if get("BUSINESS_NAME").is_some() {
                policy.prompts.business_name = business;
            }
            if get("OPENING_HOURS").is_some() {
                policy.prompts.opening_hours = hours;
            }
        }
        policy.validate().context("invalid dialogue configuration")?;

        let defaults = SpeechSettings::default();
        let speech = SpeechSettings {
            voice: get("TTS_VOICE").unwrap_or(defaults.voice),
            language: get("TTS_LANGUAGE").unwrap_or(defaults.language),
            gather_timeout_secs: match get("GATHER_TIMEOUT_SECS") {
                Some(v) => parse("GATHER_TIMEOUT_SECS", &v)?,
                None => defaults.gather_timeout_secs,
            },
            action_path: defaults.action_path,
        };

        let llm_provider: LlmChoice = get("LLM_PROVIDER").as_deref().unwrap_or("none").parse()?;
        let llm_model = get("LLM_MODEL").unwrap_or_else(|| llm_provider.default_model().to_string());

        Ok(Self {
            port: parse("PORT", &get("PORT").unwrap_or_else(|| "3000".into()))?,
            policy,
            speech,
            session_idle: idle_timeout(&get("SESSION_IDLE_SECS").unwrap_or_else(|| "1800".into()))?,
            sweep_interval_secs: parse("SWEEP_INTERVAL_SECS", &get("SWEEP_INTERVAL_SECS").unwrap_or_else(|| "60".into()))?,
            llm_provider,
            llm_model,
            llm_min_confidence: parse("LLM_MIN_CONFIDENCE", &get("LLM_MIN_CONFIDENCE").unwrap_or_else(|| "0.4".into()))?,
            notify_webhook_url: get("NOTIFY_WEBHOOK_URL"),
            notify_recipient: get("NOTIFY_RECIPIENT"),
            notify_token: get("NOTIFY_TOKEN"),
        })
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().with_context(|| format!("{} has invalid value {:?}", key, value))
}

fn idle_timeout(value: &str) -> Result<TimeDelta> {
    let secs: u64 = parse("SESSION_IDLE_SECS", value)?;
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .filter(|d| *d > TimeDelta::zero())
        .with_context(|| format!("SESSION_IDLE_SECS out of range: {}", secs))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{} has invalid boolean {:?}", key, value),
    }
}
