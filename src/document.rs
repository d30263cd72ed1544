//! Front-matter document codec
//!
//! Agent and skill records are Markdown files carrying an optional leading
//! YAML metadata block delimited by `---` lines:
//!
//! ```text
//! ---
//! name: architect
//! description: Design agent
//! ---
//! Body text...
//! ```
//!
//! Parsing is total: a missing, empty, or malformed block degrades to a
//! body-only document rather than an error, so a single corrupt file can
//! never take down a directory scan.

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Keys injected by the store when loading records. They are stripped from
/// decoded metadata and never written back into a block.
pub const RESERVED_KEYS: [&str; 3] = ["content", "id", "path"];

/// A decoded front-matter document: metadata block plus body text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Decoded metadata in block order. Empty when the document has no block.
    pub metadata: Mapping,
    /// Body text following the metadata block.
    pub body: String,
}

/// A document loaded from disk, with its derived identity.
///
/// Records are immutable snapshots; mutating one has no effect on the
/// backing file or on the store's cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Identifier derived from the file stem (agents) or directory name (skills).
    pub id: String,
    /// Source file location.
    pub path: PathBuf,
    /// Decoded metadata in block order.
    pub metadata: Mapping,
    /// Body text following the metadata block.
    pub body: String,
}

impl Record {
    /// Attach an on-disk identity to a parsed document.
    pub fn from_document(id: impl Into<String>, path: impl Into<PathBuf>, doc: Document) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            metadata: doc.metadata,
            body: doc.body,
        }
    }

    /// String-valued metadata field, if present.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Display name: the `name` metadata field, falling back to the id.
    pub fn name(&self) -> &str {
        self.field("name").unwrap_or(&self.id)
    }

    /// The `description` metadata field, if any.
    pub fn description(&self) -> Option<&str> {
        self.field("description")
    }
}

/// Parse raw document text into metadata and body.
///
/// Line endings are normalized (CRLF/CR to LF) before matching. The general
/// pattern (`---`, block, `---`, remainder) is tried first, then the
/// empty-block form (`---` immediately followed by `---`); anything else is
/// treated as a body-only document. The block match is non-greedy: the first
/// closing delimiter wins.
pub fn parse(content: &str) -> Document {
    let normalized = normalize_newlines(content);

    if let Some(after_open) = normalized.strip_prefix("---\n") {
        if let Some(split) = after_open.find("\n---\n") {
            let body = after_open[split + 5..].to_string();
            let metadata = match decode_block(&after_open[..split]) {
                Some(mut metadata) => {
                    for key in RESERVED_KEYS {
                        metadata.remove(key);
                    }
                    metadata
                }
                None => Mapping::new(),
            };
            return Document { metadata, body };
        }
        if let Some(body) = after_open.strip_prefix("---\n") {
            return Document {
                metadata: Mapping::new(),
                body: body.to_string(),
            };
        }
    }

    Document {
        metadata: Mapping::new(),
        body: content.to_string(),
    }
}

/// Read and parse a document file, injecting its identity.
pub fn load_record(id: impl Into<String>, path: &Path) -> std::io::Result<Record> {
    let content = std::fs::read_to_string(path)?;
    Ok(Record::from_document(id, path, parse(&content)))
}

/// Merge `updates` into the metadata block of `original` and re-encode.
///
/// Values in `updates` overwrite existing keys in place; new keys append in
/// merge order. The body is carried through unchanged. Reserved keys in
/// `updates` are dropped rather than merged, since they describe the record,
/// not its block.
pub fn update<I>(original: &str, updates: I) -> String
where
    I: IntoIterator<Item = (String, Value)>,
{
    let doc = parse(original);
    let mut metadata = doc.metadata;
    for (key, value) in updates {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        metadata.insert(Value::String(key), value);
    }
    serialize(&Document {
        metadata,
        body: doc.body,
    })
}

/// Encode a document back to front-matter text.
///
/// The block is wrapped in `---` delimiter lines; no YAML end-of-document
/// marker is emitted. An empty mapping collapses to the bare delimiter pair.
pub fn serialize(doc: &Document) -> String {
    if doc.metadata.is_empty() {
        return format!("---\n---\n{}", doc.body);
    }
    let block = serde_yaml::to_string(&doc.metadata).unwrap_or_default();
    format!("---\n{}---\n{}", block, doc.body)
}

fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decode a metadata block, tolerating a null document (empty block text).
/// Scalar or sequence blocks are not metadata; the caller degrades those to
/// body-only.
fn decode_block(block: &str) -> Option<Mapping> {
    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(metadata)) => Some(metadata),
        Ok(Value::Null) => Some(Mapping::new()),
        Ok(_) => None,
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
        doc.metadata.get(key).and_then(Value::as_str)
    }

    #[test]
    fn parses_document_with_front_matter() {
        let content = "---\nname: architect\ndescription: Design architecture\nmodel: opus\n---\nThis is the body content.";
        let doc = parse(content);
        assert_eq!(get(&doc, "name"), Some("architect"));
        assert_eq!(get(&doc, "description"), Some("Design architecture"));
        assert_eq!(get(&doc, "model"), Some("opus"));
        assert_eq!(doc.body, "This is the body content.");
    }

    #[test]
    fn missing_front_matter_is_body_only() {
        let doc = parse("Just plain content");
        assert_eq!(doc.body, "Just plain content");
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn empty_front_matter_block() {
        let doc = parse("---\n---\nBody only");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "Body only");
    }

    #[test]
    fn normalizes_windows_line_endings() {
        let doc = parse("---\r\nname: test\r\n---\r\nBody content");
        assert_eq!(get(&doc, "name"), Some("test"));
        assert_eq!(doc.body, "Body content");
    }

    #[test]
    fn multiline_body_survives() {
        let doc = parse("---\nname: test\n---\nLine 1\nLine 2\nLine 3");
        assert_eq!(get(&doc, "name"), Some("test"));
        assert_eq!(doc.body, "Line 1\nLine 2\nLine 3");
    }

    #[test]
    fn malformed_yaml_degrades_to_body_only() {
        let doc = parse("---\nkey: value: invalid\n---\nBody");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn empty_body_after_front_matter() {
        let doc = parse("---\nname: test\n---\n");
        assert_eq!(get(&doc, "name"), Some("test"));
        assert_eq!(doc.body, "");
    }

    #[test]
    fn scalar_block_is_not_metadata() {
        let doc = parse("---\njust a string\n---\nBody");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn reserved_keys_are_stripped_on_parse() {
        let doc = parse("---\nname: x\ncontent: smuggled\nid: fake\n---\nBody");
        assert_eq!(get(&doc, "name"), Some("x"));
        assert!(doc.metadata.get("content").is_none());
        assert!(doc.metadata.get("id").is_none());
    }

    #[test]
    fn update_overwrites_and_appends() {
        let original = "---\nname: architect\ndescription: Old\n---\nBody stays.";
        let updated = update(
            original,
            [
                ("description".to_string(), Value::from("New")),
                ("model".to_string(), Value::from("opus")),
            ],
        );
        let doc = parse(&updated);
        assert_eq!(get(&doc, "name"), Some("architect"));
        assert_eq!(get(&doc, "description"), Some("New"));
        assert_eq!(get(&doc, "model"), Some("opus"));
        assert_eq!(doc.body, "Body stays.");

        // existing keys keep their position, new keys append
        let keys: Vec<&str> = doc.metadata.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["name", "description", "model"]);
    }

    #[test]
    fn update_on_plain_document_adds_a_block() {
        let updated = update("plain body", [("name".to_string(), Value::from("fresh"))]);
        let doc = parse(&updated);
        assert_eq!(get(&doc, "name"), Some("fresh"));
        assert_eq!(doc.body, "plain body");
    }

    #[test]
    fn update_ignores_reserved_keys() {
        let updated = update(
            "---\nname: x\n---\nBody",
            [("content".to_string(), Value::from("nope"))],
        );
        let doc = parse(&updated);
        assert!(doc.metadata.get("content").is_none());
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn serialize_never_emits_end_marker() {
        let updated = update("---\nname: x\n---\nBody", []);
        assert!(!updated.contains("\n...\n"));
        assert!(updated.starts_with("---\n"));
    }

    #[test]
    fn empty_metadata_serializes_to_bare_delimiters() {
        let doc = Document {
            metadata: Mapping::new(),
            body: "Body".to_string(),
        };
        assert_eq!(serialize(&doc), "---\n---\nBody");
    }

    #[test]
    fn record_accessors_fall_back_to_id() {
        let record = Record::from_document("architect", "/tmp/architect.md", parse("no block"));
        assert_eq!(record.name(), "architect");
        assert_eq!(record.description(), None);
    }
}
