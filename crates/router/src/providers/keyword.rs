use anyhow::Result;
use async_trait::async_trait;
use protocol::phrases::{contains_phrase, is_end_call, normalize};
use protocol::Intent;

use crate::confirmation::{analyze_choice, analyze_reply};
use crate::traits::IntentClassifier;
use crate::types::{ChoicePreference, Classification, ReplyKind};

const TRANSFER: &[&str] = &[
    "transfer", "transfer me", "human", "a person", "real person", "operator", "receptionist",
    "speak to someone", "talk to someone", "speak to a", "talk to a", "put me through",
    "connect me", "transferer", "transferez", "transfert", "un conseiller", "une personne",
    "quelqu'un", "parler a",
];

const MESSAGE: &[&str] = &[
    "message", "leave a message", "take a message", "by message", "send a note", "leave a note",
    "laisser un message", "par message",
];

/// Bare mail words. They also show up in requests for something by mail
/// ("email me your hours"), so every topic keyword outranks them.
const MAIL: &[&str] = &["email", "e-mail", "mail", "par mail"];

const HOURS: &[&str] = &[
    "hours", "opening hours", "open", "opening", "close", "closing", "closed", "what time",
    "when are you", "horaires", "horaire", "ouvert", "ouverts", "ouverture", "fermez",
    "fermeture", "ferme",
];

const APPOINTMENT: &[&str] = &[
    "appointment", "book", "booking", "schedule", "reschedule", "meeting", "reservation",
    "rendez vous", "rdv", "reserver", "prendre rendez vous",
];

const PROBLEM: &[&str] = &[
    "problem", "issue", "broken", "not working", "doesn't work", "does not work", "error",
    "bug", "complaint", "trouble", "probleme", "panne", "souci", "marche pas",
    "fonctionne pas", "reclamation",
];

/// Deterministic keyword classifier.
///
/// Used standalone when no language model is configured, and as the fallback
/// inside the classifier adapter when the model times out or returns garbage.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of the classifier.
    pub fn label(&self, utterance: &str, history: &[String]) -> Classification {
        let norm = normalize(utterance);
        if norm.is_empty() {
            return Classification::other("empty utterance");
        }

        if is_end_call(&norm) {
            return Classification::new(Intent::EndCall, 0.95).with_reason("end-call phrase");
        }

        // A terse answer to "transfer now or leave a message?" only makes sense
        // in context; resolve it before fresh-intent keywords.
        if previous_asked_for_choice(history) {
            match analyze_choice(&norm) {
                ChoicePreference::Transfer => {
                    return Classification::new(Intent::TransferRequest, 0.85).with_reason("choice: transfer");
                }
                ChoicePreference::Message => {
                    return Classification::new(Intent::MessageRequest, 0.85).with_reason("choice: message");
                }
                ChoicePreference::Unclear => {}
            }
        }

        let tables: [(Intent, &[&str]); 6] = [
            (Intent::TransferRequest, TRANSFER),
            (Intent::MessageRequest, MESSAGE),
            (Intent::Appointment, APPOINTMENT),
            (Intent::Problem, PROBLEM),
            (Intent::Hours, HOURS),
            (Intent::MessageRequest, MAIL),
        ];
        for (intent, words) in tables {
            if let Some(hit) = words.iter().find(|w| contains_phrase(&norm, w)) {
                return Classification::new(intent, 0.8).with_reason(format!("keyword: {}", hit));
            }
        }

        match analyze_reply(&norm) {
            ReplyKind::Affirmative => Classification::new(Intent::Confirmation, 0.8),
            ReplyKind::Negative => Classification::new(Intent::Decline, 0.8),
            ReplyKind::Unclear => Classification {
                confidence: 0.3,
                ..Classification::other("no keyword matched")
            },
        }
    }
}

fn previous_asked_for_choice(history: &[String]) -> bool {
    history.last().is_some_and(|prev| {
        let norm = normalize(prev);
        APPOINTMENT.iter().chain(PROBLEM).any(|w| contains_phrase(&norm, w))
    })
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, utterance: &str, history: &[String]) -> Result<Classification> {
        Ok(self.label(utterance, history))
    }

    fn name(&self) -> &str {
        "KeywordClassifier"
    }
}
