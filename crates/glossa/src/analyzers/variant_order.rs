//! Unreachable variant detection
//!
//! Variants are tried in declaration order and the first one whose literal
//! conditions all hold wins. A variant is unreachable when an earlier variant
//! requires a subset of its conditions, most commonly a catch-all declared
//! before the specific cases. Dispatch is left as declared; this only reports.

use log::warn;

use crate::{
    analyzers::types::ShadowedVariant,
    model::{Bundle, Match, Message, Variant},
    types::FxIndexSet,
};

/// Variant order analyzer
#[derive(Debug)]
pub struct VariantOrderAnalyzer;

impl VariantOrderAnalyzer {
    /// Find every variant of a message that an earlier variant always beats
    pub fn find_shadowed(message: &Message) -> Vec<ShadowedVariant> {
        let conditions: Vec<FxIndexSet<(&str, &str)>> =
            message.variants.iter().map(literal_conditions).collect();

        let mut shadowed = Vec::new();
        for (index, variant) in message.variants.iter().enumerate() {
            let winner = conditions[..index]
                .iter()
                .position(|earlier| earlier.is_subset(&conditions[index]));
            if let Some(earlier) = winner {
                shadowed.push(ShadowedVariant {
                    locale: message.locale.clone(),
                    index,
                    label: variant.label(index),
                    shadowed_by: message.variants[earlier].label(earlier),
                });
            }
        }
        shadowed
    }

    /// Log a warning for every unreachable variant of a bundle
    pub fn warn_shadowed(bundle: &Bundle) -> usize {
        let mut count = 0;
        for message in &bundle.messages {
            for shadowed in Self::find_shadowed(message) {
                warn!(
                    "Variant {} of bundle `{}` ({}) is never selected: variant {} always matches first",
                    shadowed.label, bundle.id, shadowed.locale, shadowed.shadowed_by
                );
                count += 1;
            }
        }
        count
    }
}

fn literal_conditions(variant: &Variant) -> FxIndexSet<(&str, &str)> {
    variant
        .matches
        .iter()
        .filter_map(|selector| match selector {
            Match::LiteralMatch { key, value } => Some((key.as_str(), value.as_str())),
            Match::CatchallMatch { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatternPart;

    fn variant(id: &str, matches: Vec<Match>) -> Variant {
        Variant {
            id: id.to_string(),
            matches,
            pattern: vec![PatternPart::text(id)],
        }
    }

    #[test]
    fn test_catch_all_last_shadows_nothing() {
        let message = Message::new("items", "en")
            .with_variant(variant("one", vec![Match::literal("count", "1")]))
            .with_variant(variant("other", vec![Match::catch_all("count")]));
        assert!(VariantOrderAnalyzer::find_shadowed(&message).is_empty());
    }

    #[test]
    fn test_early_catch_all_shadows_later_variants() {
        let message = Message::new("items", "en")
            .with_variant(variant("other", vec![]))
            .with_variant(variant("one", vec![Match::literal("count", "1")]));
        let shadowed = VariantOrderAnalyzer::find_shadowed(&message);
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].label, "one");
        assert_eq!(shadowed[0].shadowed_by, "other");
    }

    #[test]
    fn test_less_specific_variant_shadows_more_specific() {
        let message = Message::new("items", "en")
            .with_variant(variant("a", vec![Match::literal("count", "1")]))
            .with_variant(variant(
                "b",
                vec![Match::literal("count", "1"), Match::literal("gender", "f")],
            ))
            .with_variant(variant("c", vec![Match::literal("gender", "f")]));
        let shadowed = VariantOrderAnalyzer::find_shadowed(&message);
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].index, 1);
    }
}
