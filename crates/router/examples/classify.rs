use anyhow::Result;
use router::{IntentClassifier, KeywordClassifier, LlmClassifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from workspace root
    dotenvy::from_path(".env").ok();

    let llm = LlmClassifier::from_env_groq().ok();
    match &llm {
        Some(c) => println!("Testing with model: {}", c.model()),
        None => println!("GROQ_API_KEY not set, keyword classifier only"),
    }
    let keywords = KeywordClassifier::new();

    let utterances = [
        "Bonjour, quels sont vos horaires ?",
        "I need an appointment",
        "no",
        "Quel est le but de la vie ?",
    ];

    for text in utterances {
        println!("\nUtterance: \"{}\"", text);
        println!("  keywords: {:?}", keywords.classify(text, &[]).await?.intent);
        if let Some(c) = &llm {
            let start = std::time::Instant::now();
            match c.classify(text, &[]).await {
                Ok(r) => println!("  llm ({}ms): {:?}", start.elapsed().as_millis(), r),
                Err(e) => println!("  llm error: {}", e),
            }
        }
    }

    Ok(())
}
