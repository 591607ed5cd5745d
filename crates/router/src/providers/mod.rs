pub mod keyword;
pub mod llm;
