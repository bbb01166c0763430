use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Why a transcript line (or one of its fields) could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: time::error::Parse,
    },
}

/// One decoded line of a Claude Code session transcript.
///
/// Only the fields kiln reads are modeled. `message` stays untyped because the
/// runtime writes it both as a plain string and as an object, and a shape
/// mismatch there must not make the whole line undecodable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub tool_use_result: Option<Value>,
    #[serde(default)]
    pub is_meta: Option<Value>,
    #[serde(default)]
    pub is_sidechain: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Token counters from `message.usage`. Missing, `null`, or non-integer
/// counters read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    #[serde(deserialize_with = "lenient_count")]
    pub input_tokens: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub output_tokens: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub cache_creation_input_tokens: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub cache_read_input_tokens: u64,
}

impl TokenUsage {
    /// Standing context loaded for the next call. Output tokens excluded.
    pub fn context_length(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_read_input_tokens)
            .saturating_add(self.cache_creation_input_tokens)
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(Value::deserialize(d)?.as_u64().unwrap_or(0))
}

impl TranscriptEntry {
    /// Decode one JSONL line. Anything but a JSON object is rejected.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(line)?;
        if !value.is_object() {
            return Err(ParseError::NotAnObject(json_kind(&value)));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_type(&self, ty: &str) -> bool {
        self.entry_type.as_deref() == Some(ty)
    }

    /// `toolUseResult` present and not `null`.
    pub fn has_tool_use_result(&self) -> bool {
        self.tool_use_result.is_some()
    }

    pub fn is_meta(&self) -> bool {
        self.is_meta.as_ref().is_some_and(is_truthy)
    }

    /// Only a literal `true` marks a side-chain entry.
    pub fn is_sidechain(&self) -> bool {
        matches!(self.is_sidechain, Some(Value::Bool(true)))
    }

    /// `message.content` rendered as text: strings verbatim, any other
    /// shape as compact JSON, absent as the empty string.
    pub fn content_text(&self) -> String {
        match self.message.as_ref().and_then(|m| m.get("content")) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// The `message.usage` block, if present and shaped like token counters.
    pub fn usage(&self) -> Option<TokenUsage> {
        let usage = self.message.as_ref()?.get("usage")?;
        if !usage.is_object() {
            return None;
        }
        TokenUsage::deserialize(usage).ok()
    }

    pub fn parsed_timestamp(&self) -> Result<OffsetDateTime, ParseError> {
        let raw = self
            .timestamp
            .as_deref()
            .ok_or(ParseError::Missing("timestamp"))?;
        OffsetDateTime::parse(raw, &Rfc3339).map_err(|source| ParseError::Timestamp {
            value: raw.to_string(),
            source,
        })
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JavaScript truthiness, which is what the runtime's own flags follow.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
