use anyhow::{Result, anyhow};
use protocol::Intent;
use serde_json::Value;

use crate::traits::IntentExtractor;
use crate::types::{Classification, RouterResponse};

/// Extracts a classification from model output that is supposed to be a JSON
/// object but may arrive wrapped in code fences or surrounded by prose.
pub struct JsonIntentExtractor;

impl JsonIntentExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonIntentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentExtractor for JsonIntentExtractor {
    fn extract(&self, raw: &str) -> Result<Classification> {
        let json = parse_object(raw)?;
        let response: RouterResponse = serde_json::from_value(json)?;

        // Out-of-taxonomy labels are a model mistake, not a transport failure.
        let Some(intent) = Intent::from_label(&response.intent) else {
            return Ok(Classification::other(format!("unknown label: {}", response.intent)));
        };

        Ok(Classification {
            intent,
            confidence: parse_confidence(response.confidence),
            reason: response.reason,
        })
    }
}

fn parse_object(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(v);
    }
    let start = trimmed.find('{').ok_or_else(|| anyhow!("no JSON object in model output"))?;
    let end = trimmed.rfind('}').ok_or_else(|| anyhow!("unterminated JSON object in model output"))?;
    if end < start {
        return Err(anyhow!("malformed JSON object in model output"));
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end])? {
        v @ Value::Object(_) => Ok(v),
        _ => Err(anyhow!("model output is not a JSON object")),
    }
}

fn parse_confidence(raw: Option<f32>) -> f32 {
    raw.filter(|c| c.is_finite()).map(|c| c.clamp(0.0, 1.0)).unwrap_or(0.5)
}
