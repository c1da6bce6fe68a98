use serde_json::Value;

/// Characters JSON treats as insignificant whitespace
pub const JSON_WHITESPACE: [char; 4] = [' ', '\t', '\n', '\r'];

/// Decoded body of a stored record.
///
/// A body that is not valid JSON is kept as raw text rather than failing the
/// listing it appears in.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Parsed(Value),
    Raw(String),
}

impl Body {
    /// Text used when rendering the body into a record block
    pub fn to_text(&self) -> String {
        match self {
            Self::Parsed(value) => encode(value),
            Self::Raw(text) => text.trim_end_matches(JSON_WHITESPACE).to_string(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

/// Encodes a value as compact JSON text.
pub fn encode(value: &Value) -> String {
    value.to_string()
}

/// Decodes stored text, falling back to the raw text when it is not JSON.
pub fn decode(text: &str) -> Body {
    match serde_json::from_str(text) {
        Ok(value) => Body::Parsed(value),
        Err(_) => Body::Raw(text.to_string()),
    }
}

/// Strictly parses an insert payload.
pub fn parse_payload(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(text)
}
