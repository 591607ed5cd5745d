//! Live intent classification against Groq. Ignored by default; run with
//! `cargo test -p router -- --ignored` and `GROQ_API_KEY` in `.env`.
use protocol::Intent;
use router::{IntentClassifier, LlmClassifier};

fn classifier() -> LlmClassifier {
    let _ = dotenvy::from_path("../../.env");
    LlmClassifier::from_env_groq().unwrap()
}

#[tokio::test]
#[ignore]
async fn live_top_level_intents() {
    let classifier = classifier();
    for (utterance, expected) in [
        ("Can you email me your opening hours?", Intent::Hours),
        ("Je voudrais prendre rendez-vous pour jeudi", Intent::Appointment),
        ("Put me through to someone, please", Intent::TransferRequest),
    ] {
        let c = classifier.classify(utterance, &[]).await.unwrap();
        assert_eq!(c.intent, expected, "{:?}: {:?}", utterance, c);
    }
}

#[tokio::test]
#[ignore]
async fn live_terse_reply_uses_history() {
    let classifier = classifier();
    let history = vec!["I'd like to book an appointment".to_string()];
    let c = classifier.classify("by message please", &history).await.unwrap();
    assert_eq!(c.intent, Intent::MessageRequest);
}
