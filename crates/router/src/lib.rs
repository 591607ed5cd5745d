pub mod traits;
pub mod types;
pub mod providers;
pub mod extractors;
pub mod confirmation;

pub use traits::{IntentClassifier, IntentExtractor};
pub use types::{ChoicePreference, Classification, ReplyKind, RouterResponse};

// Re-export providers
pub use providers::keyword::KeywordClassifier;
pub use providers::llm::LlmClassifier;

// Re-export extractors
pub use extractors::json::JsonIntentExtractor;
