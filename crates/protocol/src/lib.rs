pub mod phrases;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version (bumped when breaking changes are introduced)
pub const VERSION: u8 = 1;

/// One inbound turn from the telephony platform.
/// `utterance` is whatever the platform transcribed; it may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TurnInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub call_id: String,
    #[serde(default)]
    pub utterance: String,
}

impl TurnInput {
    pub fn new<S: Into<String>, U: Into<String>>(call_id: S, utterance: U) -> Self {
        Self { v: Some(VERSION), call_id: call_id.into(), utterance: utterance.into() }
    }
}

/// What the caller hears next, plus what the renderer should do after speaking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TurnReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub prompt: String,
    pub control: Control,
}

impl TurnReply {
    pub fn listen<S: Into<String>>(prompt: S) -> Self {
        Self { v: Some(VERSION), prompt: prompt.into(), control: Control::ContinueListening }
    }

    pub fn transfer<S: Into<String>, D: Into<String>>(prompt: S, destination: D) -> Self {
        Self {
            v: Some(VERSION),
            prompt: prompt.into(),
            control: Control::Transfer { destination: destination.into() },
        }
    }

    pub fn end<S: Into<String>>(prompt: S) -> Self {
        Self { v: Some(VERSION), prompt: prompt.into(), control: Control::EndCall }
    }

    /// True when the call does not continue with this system after the reply.
    pub fn is_final(&self) -> bool {
        !matches!(self.control, Control::ContinueListening)
    }
}

/// Directive for the response renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    ContinueListening,
    Transfer { destination: String },
    EndCall,
}

/// Closed intent taxonomy returned by every classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Hours,
    Appointment,
    Problem,
    TransferRequest,
    MessageRequest,
    Confirmation,
    Decline,
    EndCall,
    Other,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::Hours,
        Intent::Appointment,
        Intent::Problem,
        Intent::TransferRequest,
        Intent::MessageRequest,
        Intent::Confirmation,
        Intent::Decline,
        Intent::EndCall,
        Intent::Other,
    ];

    pub fn as_label(&self) -> &'static str {
        match self {
            Intent::Hours => "HOURS",
            Intent::Appointment => "APPOINTMENT",
            Intent::Problem => "PROBLEM",
            Intent::TransferRequest => "TRANSFER_REQUEST",
            Intent::MessageRequest => "MESSAGE_REQUEST",
            Intent::Confirmation => "CONFIRMATION",
            Intent::Decline => "DECLINE",
            Intent::EndCall => "END_CALL",
            Intent::Other => "OTHER",
        }
    }

    /// Lenient label parsing for model output: case, spaces and dashes are ignored.
    /// Anything outside the taxonomy is `None`.
    pub fn from_label(label: &str) -> Option<Intent> {
        let norm: String = label
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_uppercase() })
            .collect();
        Intent::ALL.iter().copied().find(|i| i.as_label() == norm)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_serializes_as_screaming_label() {
        let s = serde_json::to_string(&Intent::TransferRequest).unwrap();
        assert_eq!(s, "\"TRANSFER_REQUEST\"");
        let back: Intent = serde_json::from_str("\"END_CALL\"").unwrap();
        assert_eq!(back, Intent::EndCall);
    }

    #[test]
    fn from_label_is_lenient_but_closed() {
        assert_eq!(Intent::from_label("message request"), Some(Intent::MessageRequest));
        assert_eq!(Intent::from_label(" hours "), Some(Intent::Hours));
        assert_eq!(Intent::from_label("weather"), None);
    }

    #[test]
    fn control_is_tagged() {
        let reply = TurnReply::transfer("Transferring you now.", "+33100000000");
        let v = serde_json::to_value(&reply).unwrap();
        assert_eq!(v["control"]["type"], "transfer");
        assert_eq!(v["control"]["destination"], "+33100000000");
        assert!(reply.is_final());
        assert!(!TurnReply::listen("Hello").is_final());
    }

    #[test]
    fn turn_input_defaults_missing_utterance() {
        let t: TurnInput = serde_json::from_str(r#"{"call_id":"CA1"}"#).unwrap();
        assert_eq!(t.utterance, "");
        assert_eq!(t.v, None);
    }
}
