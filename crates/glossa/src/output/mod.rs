//! Output assembly
//!
//! Lays compiled bundles out as ES modules:
//!
//! - `messages/_index.js` with one dispatcher per bundle
//! - `messages/<locale>.js` with every bundle's message for that locale
//! - `messages.js`, the entry point applications import
//!
//! Modules are assembled as [`Module`] trees and rendered in one final step.

use std::collections::BTreeMap;

use log::debug;

use crate::{
    compiler::CompiledBundle,
    fallback::FallbackMap,
    js::{Expr, Generator, Item, Module, builder},
    model::ProjectSettings,
    safe_id::{locale_namespace, to_safe_module_id},
};

pub mod index_module;
pub mod locale_modules;

pub use index_module::generate_index_module;
pub use locale_modules::generate_locale_module;

/// Path of the dispatcher module
pub const INDEX_MODULE: &str = "messages/_index.js";

/// Path of the entry module
pub const ENTRY_MODULE: &str = "messages.js";

/// Import specifier of the runtime, relative to the message modules
pub const RUNTIME_SOURCE: &str = "../runtime.js";

/// Import specifier of the formatting functions, relative to the message modules
pub const REGISTRY_SOURCE: &str = "../registry.js";

/// Path of a locale's message module
pub fn locale_module_path(locale: &str) -> String {
    format!("messages/{locale}.js")
}

/// `__<locale>.<bundle>`: a locale's message as seen from the index module
pub fn message_reference(locale: &str, bundle_id: &str) -> Expr {
    builder::member(
        builder::ident(&locale_namespace(locale)),
        &to_safe_module_id(bundle_id),
    )
}

/// Generated modules keyed by path relative to the output directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    pub modules: BTreeMap<String, Module>,
}

impl Output {
    pub fn get(&self, path: &str) -> Option<&Module> {
        self.modules.get(path)
    }

    /// Serialize every module
    pub fn render(&self) -> BTreeMap<String, String> {
        let generator = Generator::default();
        self.modules
            .iter()
            .map(|(path, module)| (path.clone(), generator.module(module)))
            .collect()
    }
}

/// Assemble the modules of a compiled project
pub fn generate_output(
    compiled_bundles: &[CompiledBundle],
    settings: &ProjectSettings,
    fallback_map: &FallbackMap,
    middleware_locale_splitting: bool,
) -> Output {
    let mut output = Output::default();

    output.modules.insert(
        INDEX_MODULE.to_string(),
        generate_index_module(compiled_bundles, settings, middleware_locale_splitting),
    );
    for locale in &settings.locales {
        let fallback = fallback_map.get(locale).and_then(Option::as_deref);
        output.modules.insert(
            locale_module_path(locale),
            generate_locale_module(compiled_bundles, locale, fallback),
        );
    }
    output
        .modules
        .insert(ENTRY_MODULE.to_string(), generate_entry_module());

    debug!(
        "Assembled {} module(s) for {} bundle(s)",
        output.modules.len(),
        compiled_bundles.len()
    );
    output
}

/// `messages.js`: the dispatchers as `m` and as named exports
pub fn generate_entry_module() -> Module {
    let source = format!("./{INDEX_MODULE}");
    Module {
        items: vec![
            Item::ReExportAll {
                alias: Some("m".to_string()),
                source: source.clone(),
            },
            Item::ReExportAll {
                alias: None,
                source,
            },
        ],
    }
}
