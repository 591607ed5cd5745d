//! Live provider checks. Ignored by default; run with
//! `cargo test -p llm -- --ignored` and a key in `.env`.
use llm::{Client, Role, ChatMessage, ChatOptions};

fn init_env() {
    // Load .env from workspace root (two levels up from tests)
    let _ = dotenvy::from_path("../../.env");
}

#[tokio::test]
#[ignore]
async fn basic_call() {
    init_env();
    let cli = Client::from_env_groq("llama-3.1-8b-instant").unwrap();
    let out = cli.simple("Say OK.").await.unwrap();
    println!("Response: {}", out);
    assert!(!out.trim().is_empty());
}

#[tokio::test]
#[ignore]
async fn json_object_mode() {
    init_env();
    let cli = Client::from_env_groq("llama-3.1-8b-instant").unwrap();
    let msgs = vec![
        ChatMessage{ role: Role::System, content: "Reply ONLY as valid JSON with a field 'intent' set to HOURS".into() },
        ChatMessage{ role: Role::User, content: "when are you open?".into() }
    ];
    let out = cli.chat(&msgs, ChatOptions{ json_object: true, temperature: Some(0.0), max_tokens: None }).await.unwrap();
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v.get("intent").and_then(|x| x.as_str()), Some("HOURS"));
}
