//! The parts sequence: structured message output that keeps markup
//!
//! Markup-bearing messages expose a `.parts` capability returning a flat list
//! of tagged records. Renderers rebuild the tag tree by walking that list with
//! a stack; [`build_markup_tree`] is the reference walker and [`MarkupStack`]
//! is shared with the compiler, which rejects the same structural errors at
//! build time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FxIndexMap;

/// Option and attribute values keyed by name, in source order
pub type PartValues = FxIndexMap<String, serde_json::Value>;

/// One record of a parts sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessagePart {
    Text {
        value: String,
    },
    MarkupStart {
        name: String,
        #[serde(default)]
        options: PartValues,
        #[serde(default)]
        attributes: PartValues,
    },
    MarkupEnd {
        name: String,
        #[serde(default)]
        options: PartValues,
        #[serde(default)]
        attributes: PartValues,
    },
    MarkupStandalone {
        name: String,
        #[serde(default)]
        options: PartValues,
        #[serde(default)]
        attributes: PartValues,
    },
}

impl MessagePart {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }
}

/// Structural errors in markup nesting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupNestingError {
    #[error("closing tag `{name}` has no matching opening tag")]
    UnexpectedClose { name: String },
    #[error("closing tag `{found}` does not match the open tag `{expected}`")]
    Mismatched { expected: String, found: String },
    #[error("tag `{name}` is never closed")]
    Unclosed { name: String },
}

/// Tracks open markup tags by name
#[derive(Debug, Clone, Default)]
pub struct MarkupStack {
    open: Vec<String>,
}

impl MarkupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, name: &str) {
        self.open.push(name.to_string());
    }

    /// Close the innermost tag, which must be `name`
    pub fn close(&mut self, name: &str) -> Result<(), MarkupNestingError> {
        match self.open.last() {
            None => Err(MarkupNestingError::UnexpectedClose {
                name: name.to_string(),
            }),
            Some(expected) if expected != name => Err(MarkupNestingError::Mismatched {
                expected: expected.clone(),
                found: name.to_string(),
            }),
            Some(_) => {
                self.open.pop();
                Ok(())
            }
        }
    }

    /// Ensure every opened tag was closed, naming the innermost one otherwise
    pub fn finish(self) -> Result<(), MarkupNestingError> {
        match self.open.last() {
            Some(name) => Err(MarkupNestingError::Unclosed { name: name.clone() }),
            None => Ok(()),
        }
    }
}

/// A node of the rebuilt markup tree
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Text(String),
    Element(MarkupElement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    pub name: String,
    pub options: PartValues,
    pub attributes: PartValues,
    pub children: Vec<MarkupNode>,
    /// Came from a `markup-standalone` record
    pub standalone: bool,
}

impl MarkupElement {
    fn new(name: &str, options: &PartValues, attributes: &PartValues, standalone: bool) -> Self {
        Self {
            name: name.to_string(),
            options: options.clone(),
            attributes: attributes.clone(),
            children: Vec::new(),
            standalone,
        }
    }
}

/// Nest a flat parts sequence into a tree
///
/// Adjacent text records are kept separate, exactly as produced.
pub fn build_markup_tree(parts: &[MessagePart]) -> Result<Vec<MarkupNode>, MarkupNestingError> {
    let mut stack = MarkupStack::new();
    let mut root = Vec::new();
    let mut open: Vec<MarkupElement> = Vec::new();

    for part in parts {
        let node = match part {
            MessagePart::Text { value } => MarkupNode::Text(value.clone()),
            MessagePart::MarkupStandalone {
                name,
                options,
                attributes,
            } => MarkupNode::Element(MarkupElement::new(name, options, attributes, true)),
            MessagePart::MarkupStart {
                name,
                options,
                attributes,
            } => {
                stack.open(name);
                open.push(MarkupElement::new(name, options, attributes, false));
                continue;
            }
            MessagePart::MarkupEnd { name, .. } => {
                stack.close(name)?;
                let Some(element) = open.pop() else {
                    return Err(MarkupNestingError::UnexpectedClose { name: name.clone() });
                };
                MarkupNode::Element(element)
            }
        };
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => root.push(node),
        }
    }

    stack.finish()?;
    Ok(root)
}

/// Concatenate the text records, dropping every markup record
pub fn flatten_text(parts: &[MessagePart]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            MessagePart::Text { value } => Some(value.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn start(name: &str) -> MessagePart {
        MessagePart::MarkupStart {
            name: name.to_string(),
            options: PartValues::default(),
            attributes: PartValues::default(),
        }
    }

    fn end(name: &str) -> MessagePart {
        MessagePart::MarkupEnd {
            name: name.to_string(),
            options: PartValues::default(),
            attributes: PartValues::default(),
        }
    }

    #[test]
    fn test_parts_deserialize_from_records() {
        let parts: Vec<MessagePart> = serde_json::from_value(json!([
            { "type": "text", "value": "Read " },
            { "type": "markup-start", "name": "link", "options": { "to": "/docs" }, "attributes": {} },
            { "type": "text", "value": "docs" },
            { "type": "markup-end", "name": "link", "options": {}, "attributes": {} }
        ]))
        .expect("records should deserialize");

        assert_eq!(parts.len(), 4);
        assert!(matches!(parts[1], MessagePart::MarkupStart { .. }));
        assert_eq!(flatten_text(&parts), "Read docs");
    }

    #[test]
    fn test_tree_nests_children_under_start() {
        let mut options = PartValues::default();
        options.insert("to".to_string(), json!("/docs"));
        let parts = vec![
            MessagePart::text("Read "),
            MessagePart::MarkupStart {
                name: "link".to_string(),
                options: options.clone(),
                attributes: PartValues::default(),
            },
            MessagePart::text("docs"),
            end("link"),
        ];

        let tree = build_markup_tree(&parts).expect("balanced markup should nest");
        assert_eq!(tree.len(), 2);
        let MarkupNode::Element(link) = &tree[1] else {
            panic!("expected an element");
        };
        assert_eq!(link.name, "link");
        assert_eq!(link.options, options);
        assert_eq!(link.children, vec![MarkupNode::Text("docs".to_string())]);
        assert!(!link.standalone);
    }

    #[test]
    fn test_standalone_has_no_children() {
        let parts = vec![
            start("b"),
            MessagePart::MarkupStandalone {
                name: "icon".to_string(),
                options: PartValues::default(),
                attributes: PartValues::default(),
            },
            end("b"),
        ];
        let tree = build_markup_tree(&parts).expect("should nest");
        let MarkupNode::Element(bold) = &tree[0] else {
            panic!("expected an element");
        };
        let MarkupNode::Element(icon) = &bold.children[0] else {
            panic!("expected an element");
        };
        assert!(icon.standalone);
        assert!(icon.children.is_empty());
    }

    #[test]
    fn test_unexpected_close() {
        let error = build_markup_tree(&[end("link")]).expect_err("should fail");
        assert_eq!(
            error,
            MarkupNestingError::UnexpectedClose {
                name: "link".to_string()
            }
        );
    }

    #[test]
    fn test_mismatched_close() {
        let error = build_markup_tree(&[start("b"), start("i"), end("b")]).expect_err("should fail");
        assert_eq!(
            error,
            MarkupNestingError::Mismatched {
                expected: "i".to_string(),
                found: "b".to_string()
            }
        );
    }

    #[test]
    fn test_unclosed_start() {
        let error = build_markup_tree(&[start("b"), MessagePart::text("x")]).expect_err("should fail");
        assert_eq!(
            error,
            MarkupNestingError::Unclosed {
                name: "b".to_string()
            }
        );
        assert!(error.to_string().contains("`b`"));
    }
}
