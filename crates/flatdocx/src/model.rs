//! The source document tree.
//!
//! The shape follows the JSON form of ProseMirror documents: every node has a
//! `type`, optional `attrs`, optional `content` and `marks`, and text nodes
//! carry a `text` field. The serializer only reads the tree.

use ecow::EcoString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attributes attached to a node or a mark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs(pub Map<String, Value>);

impl Attrs {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    /// Gets a raw attribute, treating `null` as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Gets a string attribute.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Gets a numeric attribute.
    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Gets a non-negative integer attribute.
    pub fn u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    /// Gets a boolean attribute.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
}

/// A mark on a text node, e.g. emphasis or a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// The mark kind name.
    #[serde(rename = "type")]
    pub kind: EcoString,
    /// The mark attributes.
    #[serde(default)]
    pub attrs: Attrs,
}

impl Mark {
    /// Creates a mark without attributes.
    pub fn new(kind: impl Into<EcoString>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::new(),
        }
    }

    /// Creates a link mark pointing at `href`.
    pub fn link(href: &str) -> Self {
        Self::new("link").with_attrs(Attrs::new().with("href", href))
    }

    /// Replaces the attributes.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

/// A node of the source tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// The node kind name.
    #[serde(rename = "type")]
    pub kind: EcoString,
    /// The node attributes.
    #[serde(default)]
    pub attrs: Attrs,
    /// The ordered children.
    #[serde(default)]
    pub content: Vec<Node>,
    /// The marks, only meaningful on inline nodes.
    #[serde(default)]
    pub marks: Vec<Mark>,
    /// The text of a text node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<EcoString>,
}

impl Node {
    /// Creates an empty node of the given kind.
    pub fn new(kind: impl Into<EcoString>) -> Self {
        Self {
            kind: kind.into(),
            attrs: Attrs::new(),
            content: Vec::new(),
            marks: Vec::new(),
            text: None,
        }
    }

    /// Creates a text node.
    pub fn text(text: impl Into<EcoString>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new("text")
        }
    }

    /// Replaces the children.
    pub fn with_content(mut self, content: impl IntoIterator<Item = Node>) -> Self {
        self.content = content.into_iter().collect();
        self
    }

    /// Replaces the attributes.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Appends a mark.
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Whether this is a text node.
    pub fn is_text(&self) -> bool {
        self.kind == "text"
    }

    /// The link mark on this node, if any.
    pub fn link_mark(&self) -> Option<&Mark> {
        self.marks.iter().find(|mark| mark.kind == "link")
    }

    /// Concatenates the text of all descendant text nodes.
    pub fn text_content(&self) -> EcoString {
        let mut out = EcoString::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut EcoString) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_prosemirror_json() {
        let doc: Node = serde_json::from_str(
            r#"{
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [
                        { "type": "text", "text": "Hello " },
                        { "type": "text", "text": "world", "marks": [{ "type": "strong" }] }
                    ]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.kind, "doc");
        let para = &doc.content[0];
        assert_eq!(para.content.len(), 2);
        assert_eq!(para.content[1].marks, vec![Mark::new("strong")]);
        assert_eq!(doc.text_content(), "Hello world");
    }

    #[test]
    fn null_attributes_are_absent() {
        let attrs: Attrs = serde_json::from_str(r#"{ "id": null, "level": 2 }"#).unwrap();
        assert_eq!(attrs.str("id"), None);
        assert_eq!(attrs.u64("level"), Some(2));
    }
}
