//! Input signature derivation
//!
//! Narrows each input to the literals its selectors compare it against, so
//! static tooling can flag values no variant handles.

use log::trace;

use crate::{
    analyzers::types::{InputMatchTypes, InputSignature, InputType},
    model::{Bundle, Declaration, Match},
    types::FxIndexSet,
};

/// Input type analyzer
#[derive(Debug)]
pub struct InputTypeAnalyzer;

impl InputTypeAnalyzer {
    /// Input names in declaration order, first occurrence wins
    pub fn unique_inputs(declarations: &[Declaration]) -> FxIndexSet<&str> {
        declarations
            .iter()
            .filter(|declaration| declaration.is_input())
            .map(Declaration::name)
            .collect()
    }

    /// Collect the literals and catch-alls applied to every input
    ///
    /// A variant without any match accepts everything, so it marks every
    /// input as unconstrained. Matches on local variables are ignored.
    pub fn collect_match_types(bundle: &Bundle) -> InputMatchTypes {
        let inputs = Self::unique_inputs(&bundle.declarations);
        let mut match_types = InputMatchTypes::new();

        for variant in bundle.messages.iter().flat_map(|message| &message.variants) {
            if variant.matches.is_empty() {
                for input in &inputs {
                    match_types
                        .entry((*input).to_string())
                        .or_default()
                        .has_catch_all = true;
                }
                continue;
            }
            for selector in &variant.matches {
                if !inputs.contains(selector.key()) {
                    continue;
                }
                let info = match_types.entry(selector.key().to_string()).or_default();
                match selector {
                    Match::LiteralMatch { value, .. } => {
                        info.literals.insert(value.clone());
                    }
                    Match::CatchallMatch { .. } => info.has_catch_all = true,
                }
            }
        }

        trace!(
            "Collected match types for {} input(s) of bundle {}",
            match_types.len(),
            bundle.id
        );
        match_types
    }

    /// Build the signature of a bundle's input object
    pub fn analyze(bundle: &Bundle, match_types: &InputMatchTypes) -> InputSignature {
        let fields = Self::unique_inputs(&bundle.declarations)
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    InputType::from_match_type(match_types.get(name)),
                )
            })
            .collect();
        InputSignature { fields }
    }
}
