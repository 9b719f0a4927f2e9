//! Common types used across analyzers
//!
//! Every analyzer is a pure reduction over a bundle and returns one of these
//! summaries. Keys live in ordered collections so rendering is deterministic.

use std::collections::{BTreeMap, BTreeSet};

use crate::{js::printer::string_literal, safe_id::property_key};

/// Fallback type for values nothing constrains
pub const UNCONSTRAINED: &str = "NonNullable<unknown>";

/// What the variants of a bundle compare one selector against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchType {
    /// Literal values seen in `literal-match` conditions
    pub literals: BTreeSet<String>,
    /// Whether any variant accepts every value
    pub has_catch_all: bool,
}

/// Match information per input name
pub type InputMatchTypes = BTreeMap<String, MatchType>;

/// The accepted values of one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    Unconstrained,
    /// A union of the literals the input is compared against
    Literals(BTreeSet<String>),
}

impl InputType {
    pub fn from_match_type(match_type: Option<&MatchType>) -> Self {
        match match_type {
            Some(info) if !info.has_catch_all && !info.literals.is_empty() => {
                Self::Literals(info.literals.clone())
            }
            _ => Self::Unconstrained,
        }
    }

    /// JSDoc rendering: `NonNullable<unknown>` or `"one" | "other"`
    pub fn render(&self) -> String {
        match self {
            Self::Unconstrained => UNCONSTRAINED.to_string(),
            Self::Literals(literals) => literals
                .iter()
                .map(String::as_str)
                .map(string_literal)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// The caller-facing input object of a bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSignature {
    pub fields: BTreeMap<String, InputType>,
}

impl InputSignature {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn type_of(&self, name: &str) -> Option<&InputType> {
        self.fields.get(name)
    }

    /// JSDoc rendering: `{ age: NonNullable<unknown>, "half!": "a" | "b" }`
    pub fn render(&self) -> String {
        if self.fields.is_empty() {
            return "{}".to_string();
        }
        let fields = self
            .fields
            .iter()
            .map(|(name, ty)| format!("{}: {}", property_key(name), ty.render()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{ {fields} }}")
    }
}

/// Whether a markup tag wraps content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Children {
    /// Only seen as start/end pairs
    Always,
    /// Only seen standalone
    Never,
    /// Seen both ways
    Either,
}

impl Children {
    pub fn merge(self, other: Self) -> Self {
        if self == other { self } else { Self::Either }
    }

    pub fn render(self) -> &'static str {
        match self {
            Self::Always => "true",
            Self::Never => "false",
            Self::Either => "boolean",
        }
    }
}

/// Value types and presence count of one option or attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    pub types: BTreeSet<String>,
    /// Number of tag occurrences carrying the field
    pub count: usize,
}

impl FieldSchema {
    fn render_type(&self) -> String {
        if self.types.is_empty() {
            return "never".to_string();
        }
        self.types.iter().cloned().collect::<Vec<_>>().join(" | ")
    }
}

/// Shape of one markup tag across every message of a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSchema {
    /// Number of start and standalone records
    pub occurrences: usize,
    pub children: Children,
    pub options: BTreeMap<String, FieldSchema>,
    pub attributes: BTreeMap<String, FieldSchema>,
}

impl TagSchema {
    /// A field is required when every occurrence carries it
    pub fn is_required(&self, field: &FieldSchema) -> bool {
        field.count >= self.occurrences
    }

    fn render_fields(&self, fields: &BTreeMap<String, FieldSchema>) -> String {
        if fields.is_empty() {
            return "{}".to_string();
        }
        let properties = fields
            .iter()
            .map(|(name, field)| {
                let optional = if self.is_required(field) { "" } else { "?" };
                format!("{}{optional}: {}", property_key(name), field.render_type())
            })
            .collect::<Vec<_>>()
            .join("; ");
        format!("{{ {properties} }}")
    }

    pub fn render(&self) -> String {
        format!(
            "{{ options: {}; attributes: {}; children: {} }}",
            self.render_fields(&self.options),
            self.render_fields(&self.attributes),
            self.children.render()
        )
    }
}

/// Markup tags used by a bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupSchema {
    pub tags: BTreeMap<String, TagSchema>,
}

impl MarkupSchema {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// JSDoc rendering, `{}` when the bundle has no markup
    pub fn render(&self) -> String {
        if self.tags.is_empty() {
            return "{}".to_string();
        }
        let tags = self
            .tags
            .iter()
            .map(|(name, tag)| format!("{}: {}", property_key(name), tag.render()))
            .collect::<Vec<_>>()
            .join("; ");
        format!("{{ {tags} }}")
    }
}

/// A variant that can never be selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedVariant {
    pub locale: String,
    /// Position and label of the unreachable variant
    pub index: usize,
    pub label: String,
    /// Label of the earlier variant that always wins first
    pub shadowed_by: String,
}
