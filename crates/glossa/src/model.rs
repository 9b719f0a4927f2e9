//! Input records consumed by the compiler
//!
//! These mirror the structured documents an external loader produces for a
//! project: bundles, their declarations, one message per locale and the
//! variants of each message. The compiler only reads them; nothing here is
//! mutated during a compile pass.

use serde::{Deserialize, Serialize};

/// Project-wide locale settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    pub base_locale: String,
    pub locales: Vec<String>,
}

impl ProjectSettings {
    pub fn new(base_locale: impl Into<String>, locales: &[&str]) -> Self {
        Self {
            base_locale: base_locale.into(),
            locales: locales.iter().map(|locale| (*locale).to_string()).collect(),
        }
    }
}

/// The unit of translation: one id, one message per locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// Arbitrary string, not necessarily a valid identifier
    pub id: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Bundle {
    /// Whether any variant of any message contains markup
    pub fn has_markup(&self) -> bool {
        self.messages.iter().any(Message::has_markup)
    }
}

/// A variable declaration shared by every message of a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Declaration {
    /// Supplied by the caller
    InputVariable { name: String },
    /// Computed once per locale from an expression
    LocalVariable { name: String, value: Expression },
}

impl Declaration {
    pub fn input(name: impl Into<String>) -> Self {
        Self::InputVariable { name: name.into() }
    }

    pub fn local(name: impl Into<String>, value: Expression) -> Self {
        Self::LocalVariable {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::InputVariable { name } | Self::LocalVariable { name, .. } => name,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, Self::InputVariable { .. })
    }
}

/// One locale's realization of a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub bundle_id: String,
    pub locale: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Message {
    pub fn new(bundle_id: impl Into<String>, locale: impl Into<String>) -> Self {
        let bundle_id = bundle_id.into();
        let locale = locale.into();
        Self {
            id: format!("{bundle_id}_{locale}"),
            bundle_id,
            locale,
            variants: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn has_markup(&self) -> bool {
        self.variants.iter().any(Variant::has_markup)
    }
}

/// One selector-conditioned rendering of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub matches: Vec<Match>,
    pub pattern: Pattern,
}

impl Variant {
    pub fn new(matches: Vec<Match>, pattern: Pattern) -> Self {
        Self {
            id: String::new(),
            matches,
            pattern,
        }
    }

    /// A variant without conditions: no matches, or catch-all matches only
    pub fn is_catch_all(&self) -> bool {
        self.matches.iter().all(Match::is_catch_all)
    }

    pub fn has_markup(&self) -> bool {
        self.pattern.iter().any(PatternPart::is_markup)
    }

    /// Human readable label used in diagnostics
    pub fn label(&self, index: usize) -> String {
        if self.id.is_empty() {
            format!("#{index}")
        } else {
            self.id.clone()
        }
    }
}

/// A selector condition of a variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Match {
    /// Holds when the selected variable equals `value`
    LiteralMatch { key: String, value: String },
    /// Holds for any value
    CatchallMatch { key: String },
}

impl Match {
    pub fn literal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::LiteralMatch {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn catch_all(key: impl Into<String>) -> Self {
        Self::CatchallMatch { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::LiteralMatch { key, .. } | Self::CatchallMatch { key } => key,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::CatchallMatch { .. })
    }
}

/// Ordered parts of a variant's content
pub type Pattern = Vec<PatternPart>;

/// One element of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PatternPart {
    Text { value: String },
    Expression(Expression),
    MarkupStart(Markup),
    MarkupEnd(Markup),
    MarkupStandalone(Markup),
}

impl PatternPart {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// An expression part referencing a declared variable
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Expression(Expression::variable(name))
    }

    pub fn is_markup(&self) -> bool {
        matches!(
            self,
            Self::MarkupStart(_) | Self::MarkupEnd(_) | Self::MarkupStandalone(_)
        )
    }

    /// The record tag used in the parts sequence
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Expression(_) => "expression",
            Self::MarkupStart(_) => "markup-start",
            Self::MarkupEnd(_) => "markup-end",
            Self::MarkupStandalone(_) => "markup-standalone",
        }
    }
}

/// A placeholder: a literal or a variable reference, optionally formatted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub arg: Argument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<FunctionReference>,
}

impl Expression {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            arg: Argument::literal(value),
            annotation: None,
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            arg: Argument::variable(name),
            annotation: None,
        }
    }

    #[must_use]
    pub fn annotated(mut self, function: FunctionReference) -> Self {
        self.annotation = Some(function);
        self
    }
}

/// The operand of an expression or option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Argument {
    Literal { value: String },
    VariableReference { name: String },
}

impl Argument {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::VariableReference { name: name.into() }
    }
}

/// A formatting function applied to an expression, e.g. `plural` or `number`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionReference {
    pub name: String,
    #[serde(default)]
    pub options: Vec<MarkupOption>,
}

impl FunctionReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: Argument) -> Self {
        self.options.push(MarkupOption {
            name: name.into(),
            value,
        });
        self
    }
}

/// Payload shared by markup start, end and standalone parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    pub name: String,
    #[serde(default)]
    pub options: Vec<MarkupOption>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Markup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: Argument) -> Self {
        self.options.push(MarkupOption {
            name: name.into(),
            value,
        });
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value,
        });
        self
    }
}

/// A named option of a markup tag or function reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupOption {
    pub name: String,
    pub value: Argument,
}

/// A named attribute of a markup tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Attribute values are either the flag `true` or a literal string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAttributeValue", into = "RawAttributeValue")]
pub enum AttributeValue {
    True,
    Literal(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawAttributeValue {
    Flag(bool),
    Literal {
        #[serde(rename = "type")]
        kind: String,
        value: String,
    },
}

impl TryFrom<RawAttributeValue> for AttributeValue {
    type Error = String;

    fn try_from(raw: RawAttributeValue) -> Result<Self, Self::Error> {
        match raw {
            RawAttributeValue::Flag(true) => Ok(Self::True),
            RawAttributeValue::Flag(false) => {
                Err("attribute value `false` is not allowed, omit the attribute".to_string())
            }
            RawAttributeValue::Literal { kind, value } if kind == "literal" => {
                Ok(Self::Literal(value))
            }
            RawAttributeValue::Literal { kind, .. } => {
                Err(format!("unsupported attribute value type `{kind}`"))
            }
        }
    }
}

impl From<AttributeValue> for RawAttributeValue {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::True => Self::Flag(true),
            AttributeValue::Literal(value) => Self::Literal {
                kind: "literal".to_string(),
                value,
            },
        }
    }
}
