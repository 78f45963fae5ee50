//! Lenient handling of JSON returned by LLMs

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

/// Strip markdown fences and keep the first `{` through the last `}`
///
/// Text without a brace pair is returned with only the fences removed.
pub fn clean_json_reply(reply: &str) -> String {
    let stripped = reply.replace("```json", "").replace("```", "");
    match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if end > start => stripped[start..=end].to_string(),
        _ => stripped.trim().to_string(),
    }
}

/// Clean and decode an LLM reply
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> serde_json::Result<T> {
    serde_json::from_str(&clean_json_reply(reply))
}

/// Accept any JSON scalar as an optional string
///
/// Models write `"metric": 50`, `"metric": "50%"` and `"metric": null`
/// interchangeably.
pub fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Accept a number or numeric string, defaulting to zero
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or_default(),
        _ => 0.0,
    })
}

/// Accept a number or numeric string as an id, defaulting to zero
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.max(0.0) as u32)
}
