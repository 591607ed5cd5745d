use anyhow::{Context, Result, anyhow};
use reqwest::Client as Http;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAi,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    fn key_var(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    http: Http,
    provider: Provider,
    api_key: String,
    model: String,
    base_url: String, // provider-specific defaulted
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role { System, User, Assistant }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    /// If true, request JSON-only output (`json_object`) when provider supports it.
    pub json_object: bool,
    pub max_tokens: Option<u32>,
}

impl Client {
    pub fn new(provider: Provider, api_key: String, model: String) -> Result<Self> {
        let base_url = provider.default_base_url().to_string();
        Ok(Self {
            http: Http::builder()
                .pool_max_idle_per_host(8)
                .connect_timeout(Duration::from_secs(5))
                .build()?,
            provider, api_key, model, base_url,
        })
    }

    /// Pick up the provider's API key from the environment.
    pub fn from_env(provider: Provider, model: &str) -> Result<Self> {
        let var = provider.key_var();
        let key = std::env::var(var).with_context(|| format!("{} not set", var))?;
        Self::new(provider, key, model.to_string())
    }

    /// Convenience: pick up GROQ_API_KEY from env for Groq.
    pub fn from_env_groq(model: &str) -> Result<Self> {
        Self::from_env(Provider::Groq, model)
    }

    /// Point the client at a different OpenAI-compatible endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn chat(&self, messages: &[ChatMessage], opts: ChatOptions) -> Result<String> {
        // Both providers speak OpenAI-compatible Chat Completions
        let url = format!("{}/chat/completions", self.base_url);

        let msgs: Vec<Value> = messages.iter().map(|m| {
            let role = match m.role { Role::System=>"system", Role::User=>"user", Role::Assistant=>"assistant" };
            json!({ "role": role, "content": m.content })
        }).collect();

        let mut body = json!({
            "model": self.model,
            "messages": msgs,
            "temperature": opts.temperature.unwrap_or(0.0)
        });
        if let Some(obj) = body.as_object_mut() {
            if opts.json_object {
                obj.insert("response_format".into(), json!({ "type": "json_object" }));
            }
            if let Some(max) = opts.max_tokens {
                obj.insert("max_tokens".into(), json!(max));
            }
        }

        let resp = self.http.post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send().await
            .context("request failed")?;

        if !resp.status().is_success() {
            return Err(anyhow!("{:?} {}: {}", self.provider, resp.status(), resp.text().await.unwrap_or_default()));
        }

        let v: Value = resp.json().await.context("invalid json")?;
        let content = v.pointer("/choices/0/message/content")
            .and_then(|x| x.as_str())
            .ok_or_else(|| anyhow!("missing choices[0].message.content"))?;
        Ok(content.to_string())
    }

    /// Simple helper for one-shot prompts.
    pub async fn simple(&self, prompt: &str) -> Result<String> {
        let msgs = vec![ChatMessage::user(prompt)];
        self.chat(&msgs, ChatOptions::default()).await
    }
}
