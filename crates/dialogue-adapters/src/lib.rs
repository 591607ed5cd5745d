//! Production implementations of the dialogue-core ports.

pub mod classifier;
pub mod notify;
pub mod transfer;

pub use classifier::RouterClassifier;
pub use notify::{HttpNotifier, LogNotifier, Notifier};
pub use transfer::DirectiveTransfer;
