use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Draft-js raw document: `{"blocks":[...],"entityMap":{}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RichTextDocument {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub entity_map: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub key: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default = "unstyled")]
    pub block_type: String,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub inline_style_ranges: Vec<Value>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub entity_ranges: Vec<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Map<String, Value>,
}

fn unstyled() -> String {
    "unstyled".to_string()
}

impl Block {
    fn unstyled(key: String, text: String) -> Self {
        Self {
            key,
            text,
            block_type: unstyled(),
            depth: 0,
            inline_style_ranges: Vec::new(),
            entity_ranges: Vec::new(),
            data: Map::new(),
        }
    }
}

impl Default for RichTextDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl RichTextDocument {
    /// "No content yet": a single empty unstyled block
    pub fn empty() -> Self {
        Self {
            blocks: vec![Block::unstyled("empty".to_string(), String::new())],
            entity_map: Map::new(),
        }
    }

    /// One unstyled block per line
    pub fn from_plain_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::empty();
        }

        let blocks = text
            .lines()
            .enumerate()
            .map(|(i, line)| Block::unstyled(format!("b{}", i), line.to_string()))
            .collect();

        Self {
            blocks,
            entity_map: Map::new(),
        }
    }

    /// Accepts a document object, a serialized document string, a plain text
    /// string or null.
    pub fn parse(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Null => Ok(Self::empty()),
            Value::String(s) => match serde_json::from_str::<RichTextDocument>(&s) {
                Ok(doc) => Ok(doc),
                Err(_) => Ok(Self::from_plain_text(&s)),
            },
            other => serde_json::from_value(other),
        }
    }

    /// Stored documents are trusted; a corrupt one reads as empty
    pub fn from_stored(value: Value) -> Self {
        Self::parse(value).unwrap_or_else(|e| {
            tracing::warn!("Unreadable stored document: {}", e);
            Self::empty()
        })
    }

    /// Emptiness as judged at submission: only the first block's text counts
    pub fn is_blank(&self) -> bool {
        self.blocks
            .first()
            .is_none_or(|block| block.text.trim().is_empty())
    }

    /// Whether any block carries text
    pub fn has_text(&self) -> bool {
        self.blocks.iter().any(|b| !b.text.trim().is_empty())
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First `max_chars` characters of the plain text, cut at a word boundary
    pub fn excerpt(&self, max_chars: usize) -> String {
        let text = self.plain_text().split_whitespace().collect::<Vec<_>>().join(" ");
        if text.chars().count() <= max_chars {
            return text;
        }

        let cut: String = text.chars().take(max_chars).collect();
        match cut.rfind(' ') {
            Some(idx) if idx > 0 => format!("{}…", &cut[..idx]),
            _ => format!("{}…", cut),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_sentinel_is_blank() {
        let doc = RichTextDocument::empty();
        assert!(doc.is_blank());
        assert!(!doc.has_text());
        assert_eq!(doc, RichTextDocument::from_plain_text("  \n "));
    }

    #[test]
    fn test_blank_judged_by_first_block_only() {
        let doc = RichTextDocument::parse(json!({
            "blocks": [
                {"key": "a", "text": "", "type": "unstyled"},
                {"key": "b", "text": "Second paragraph", "type": "unstyled"}
            ],
            "entityMap": {}
        }))
        .unwrap();

        assert!(doc.is_blank());
        assert!(doc.has_text());
    }

    #[test]
    fn test_parse_accepts_serialized_and_plain_strings() {
        let serialized = r#"{"blocks":[{"key":"x","text":"Kavithai","type":"header-one"}],"entityMap":{}}"#;
        let doc = RichTextDocument::parse(Value::String(serialized.to_string())).unwrap();
        assert_eq!(doc.blocks[0].block_type, "header-one");
        assert_eq!(doc.plain_text(), "Kavithai");

        let doc = RichTextDocument::parse(json!("line one\nline two")).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.plain_text(), "line one\nline two");

        assert!(RichTextDocument::parse(Value::Null).unwrap().is_blank());
        assert!(RichTextDocument::parse(json!(42)).is_err());
    }

    #[test]
    fn test_serializes_with_draft_js_keys() {
        let value = RichTextDocument::from_plain_text("Hello").to_value();
        assert_eq!(value["blocks"][0]["type"], "unstyled");
        assert_eq!(value["blocks"][0]["inlineStyleRanges"], json!([]));
        assert_eq!(value["entityMap"], json!({}));
    }

    #[test]
    fn test_excerpt_cuts_at_word_boundary() {
        let doc = RichTextDocument::from_plain_text("The river sings\nat dawn");
        assert_eq!(doc.excerpt(100), "The river sings at dawn");
        assert_eq!(doc.excerpt(12), "The river…");
    }
}
