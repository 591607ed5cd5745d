use anyhow::Result;
use async_trait::async_trait;

use crate::extractors::json::JsonIntentExtractor;
use crate::traits::{IntentClassifier, IntentExtractor};
use crate::types::Classification;

const SYSTEM_PROMPT: &str = r#"You are the intent router of a telephone answering assistant.
Callers speak English or French. Classify the caller's latest utterance.

LABELS:
- HOURS: asks about opening hours, when the office is open or closed
- APPOINTMENT: wants to book, move or ask about an appointment
- PROBLEM: reports a problem, outage, complaint or something not working
- TRANSFER_REQUEST: wants to speak to a human, or picks "transfer now" when offered
- MESSAGE_REQUEST: wants to leave a message or be contacted by e-mail, or picks "by message" when offered
- CONFIRMATION: says yes / agrees to what was just offered
- DECLINE: says no / refuses what was just offered (a bare "no" is DECLINE, never END_CALL)
- END_CALL: explicitly ends the conversation ("goodbye", "au revoir", "you can hang up")
- OTHER: anything else, unclear speech, off-topic questions

Use the recent utterances to interpret short replies: "yes" after asking about hours is CONFIRMATION,
"now" after an appointment request is TRANSFER_REQUEST.

OUTPUT FORMAT (JSON only):
{"intent": "<LABEL>", "confidence": 0.0-1.0, "reason": "short explanation"}"#;

/// Language-model backed classifier over the `llm` crate.
pub struct LlmClassifier {
    client: ::llm::Client,
    extractor: JsonIntentExtractor,
}

impl LlmClassifier {
    pub fn new(client: ::llm::Client) -> Self {
        Self { client, extractor: JsonIntentExtractor::new() }
    }

    /// Groq client, model from `GROQ_MODEL` or llama-3.1-8b-instant.
    pub fn from_env_groq() -> Result<Self> {
        let model = std::env::var("GROQ_MODEL")
            .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());
        Ok(Self::new(::llm::Client::from_env_groq(&model)?))
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

/// Renders the caller's recent utterances for the model, oldest first.
pub fn history_context(history: &[String]) -> String {
    if history.is_empty() {
        return String::new();
    }
    let mut context = format!("Recent caller utterances (last {}):\n", history.len());
    for (i, line) in history.iter().enumerate() {
        context.push_str(&format!("{}. {}\n", i + 1, line));
    }
    context
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(&self, utterance: &str, history: &[String]) -> Result<Classification> {
        let context = history_context(history);
        let user = if context.is_empty() {
            format!("Utterance: \"{}\"", utterance)
        } else {
            format!("{}\nUtterance: \"{}\"", context, utterance)
        };

        let messages = vec![::llm::ChatMessage::system(SYSTEM_PROMPT), ::llm::ChatMessage::user(user)];
        let options = ::llm::ChatOptions {
            temperature: Some(0.0),
            json_object: true,
            max_tokens: Some(80),
        };

        let raw = self.client.chat(&messages, options).await?;
        self.extractor.extract(&raw)
    }

    fn name(&self) -> &str {
        "LlmClassifier"
    }
}
