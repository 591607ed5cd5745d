use protocol::phrases::{contains_phrase, normalize};

use crate::types::{ChoicePreference, ReplyKind};

const AFFIRMATIVE_WORDS: &[&str] = &[
    "yes", "yeah", "yep", "yup", "ok", "okay", "sure", "alright", "please", "absolutely",
    "certainly", "oui", "ouais", "volontiers", "d'accord", "daccord", "bien sur", "go ahead",
    "of course", "why not", "please do",
];

const NEGATIVE_WORDS: &[&str] = &[
    "no", "nope", "nah", "non", "not really", "no thanks", "no thank you", "non merci",
    "pas besoin", "not now", "don't bother", "never mind", "ca ira", "laisse tomber",
];

const TRANSFER_CHOICE: &[&str] = &[
    "transfer", "transfer me", "now", "right now", "put me through", "connect me",
    "the first", "first one", "first option", "speak to", "talk to", "maintenant",
    "tout de suite", "transferez", "transferer", "transfert", "le premier", "la premiere",
];

const MESSAGE_CHOICE: &[&str] = &[
    "message", "by message", "a message", "leave a message", "email", "e-mail", "mail",
    "text", "the second", "second one", "second option", "the latter", "par message",
    "un message", "laisser un message", "par mail", "par email", "le second", "le deuxieme",
    "la deuxieme",
];

/// Classifies a reply to a yes/no offer. Mixed signals ("yes no") are unclear.
pub fn analyze_reply(text: &str) -> ReplyKind {
    let norm = normalize(text);
    if norm.is_empty() {
        return ReplyKind::Unclear;
    }
    let yes = AFFIRMATIVE_WORDS.iter().any(|p| contains_phrase(&norm, p));
    let no = NEGATIVE_WORDS.iter().any(|p| contains_phrase(&norm, p));
    match (yes, no) {
        (true, false) => ReplyKind::Affirmative,
        (false, true) => ReplyKind::Negative,
        // "no thanks" also contains "thanks"; negation outranks politeness words
        (true, true) if is_polite_refusal(&norm) => ReplyKind::Negative,
        _ => ReplyKind::Unclear,
    }
}

fn is_polite_refusal(norm: &str) -> bool {
    norm.starts_with("no ") || norm.starts_with("non ") || norm == "no" || norm == "non"
}

/// Classifies a reply to "transfer now, or leave a message?".
pub fn analyze_choice(text: &str) -> ChoicePreference {
    let norm = normalize(text);
    let transfer = TRANSFER_CHOICE.iter().any(|p| contains_phrase(&norm, p));
    let message = MESSAGE_CHOICE.iter().any(|p| contains_phrase(&norm, p));
    match (transfer, message) {
        (true, false) => ChoicePreference::Transfer,
        (false, true) => ChoicePreference::Message,
        _ => ChoicePreference::Unclear,
    }
}
