pub mod state;
pub mod history;
pub mod context;

pub use state::{DialogueState, Topic};
pub use history::UtteranceHistory;
pub use context::Session;
