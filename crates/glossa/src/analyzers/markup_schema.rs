//! Markup schema derivation
//!
//! Describes, per tag, which options and attributes renderers receive and
//! whether the tag wraps content.

use std::collections::BTreeMap;

use crate::{
    analyzers::types::{
        Children, FieldSchema, InputSignature, MarkupSchema, TagSchema, UNCONSTRAINED,
    },
    model::{Argument, AttributeValue, Bundle, Markup, PatternPart},
    types::FxIndexSet,
};

/// Markup schema analyzer
#[derive(Debug)]
pub struct MarkupSchemaAnalyzer;

impl MarkupSchemaAnalyzer {
    /// Scan every start and standalone record of every variant
    pub fn analyze(bundle: &Bundle, signature: &InputSignature) -> MarkupSchema {
        let mut tags: BTreeMap<String, TagSchema> = BTreeMap::new();

        let records = bundle
            .messages
            .iter()
            .flat_map(|message| &message.variants)
            .flat_map(|variant| &variant.pattern);
        for part in records {
            let (markup, children) = match part {
                PatternPart::MarkupStart(markup) => (markup, Children::Always),
                PatternPart::MarkupStandalone(markup) => (markup, Children::Never),
                _ => continue,
            };
            let tag = tags.entry(markup.name.clone()).or_insert(TagSchema {
                occurrences: 0,
                children,
                options: BTreeMap::new(),
                attributes: BTreeMap::new(),
            });
            tag.occurrences += 1;
            tag.children = tag.children.merge(children);
            Self::collect_options(tag, markup, signature);
            Self::collect_attributes(tag, markup);
        }

        MarkupSchema { tags }
    }

    fn collect_options(tag: &mut TagSchema, markup: &Markup, signature: &InputSignature) {
        let mut seen = FxIndexSet::default();
        for option in &markup.options {
            let field = tag.options.entry(option.name.clone()).or_default();
            field.types.insert(Self::option_type(&option.value, signature));
            if seen.insert(option.name.as_str()) {
                field.count += 1;
            }
        }
    }

    fn collect_attributes(tag: &mut TagSchema, markup: &Markup) {
        let mut seen = FxIndexSet::default();
        for attribute in &markup.attributes {
            let field: &mut FieldSchema = tag.attributes.entry(attribute.name.clone()).or_default();
            field.types.insert(
                match attribute.value {
                    AttributeValue::True => "true",
                    AttributeValue::Literal(_) => "string",
                }
                .to_string(),
            );
            if seen.insert(attribute.name.as_str()) {
                field.count += 1;
            }
        }
    }

    /// Literals are strings, inputs carry their signature type and locals
    /// are unconstrained
    fn option_type(value: &Argument, signature: &InputSignature) -> String {
        match value {
            Argument::Literal { .. } => "string".to_string(),
            Argument::VariableReference { name } => signature
                .type_of(name)
                .map_or_else(|| UNCONSTRAINED.to_string(), |ty| ty.render()),
        }
    }
}
