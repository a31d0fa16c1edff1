//! A single journal line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// RFC 3339 timestamp with milliseconds
    pub ts: String,
    pub level: String,
    /// Module path of the event (e.g. "runecast_core::engine")
    pub target: String,
    pub msg: String,
    /// Structured event fields, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
    /// Enclosing spans, outermost first, joined with " > "
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
}

impl JournalEntry {
    pub fn new(level: impl Into<String>, target: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            level: level.into(),
            target: target.into(),
            msg: msg.into(),
            fields: None,
            span: None,
        }
    }

    pub fn with_fields(mut self, fields: Value) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }

    /// Serialize to one line, without the trailing newline.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_line_format() {
        let entry = JournalEntry::new("info", "runecast_core::engine", "reading saved")
            .with_fields(serde_json::json!({ "spread": "three_rune" }));

        let line = entry.to_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"level\":\"info\""));
        assert!(line.contains("\"spread\":\"three_rune\""));
        assert!(!line.contains("\"span\""));

        assert_eq!(JournalEntry::from_line(&line).unwrap(), entry);
    }
}
