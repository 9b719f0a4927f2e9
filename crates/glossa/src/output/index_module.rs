//! The dispatcher module

use crate::{
    analyzers::jsdoc::LOCALIZED_STRING_IMPORT,
    compiler::CompiledBundle,
    js::{Module, builder},
    model::ProjectSettings,
    output::RUNTIME_SOURCE,
    safe_id::locale_namespace,
};

/// Runtime bindings every dispatcher reads
const RUNTIME_IMPORTS: &[&str] = &["getLocale", "experimentalStaticLocale"];

/// Extra runtime bindings read in middleware-split mode
const MIDDLEWARE_IMPORTS: &[&str] = &[
    "trackMessageCall",
    "experimentalMiddlewareLocaleSplitting",
    "isServer",
];

/// Build `messages/_index.js`
pub fn generate_index_module(
    compiled_bundles: &[CompiledBundle],
    settings: &ProjectSettings,
    middleware_locale_splitting: bool,
) -> Module {
    let mut module = Module::new();

    let mut imports = RUNTIME_IMPORTS.to_vec();
    if middleware_locale_splitting {
        imports.extend_from_slice(MIDDLEWARE_IMPORTS);
    }
    module.push(builder::import(&imports, RUNTIME_SOURCE));
    module.push(builder::typedef(LOCALIZED_STRING_IMPORT, "LocalizedString"));
    for compiled in compiled_bundles {
        module.push(builder::typedef(
            compiled.signature.render(),
            &compiled.input_type_alias,
        ));
    }
    for locale in &settings.locales {
        module.push(builder::import_namespace(
            &locale_namespace(locale),
            &format!("./{locale}.js"),
        ));
    }
    for compiled in compiled_bundles {
        module.items.extend(compiled.dispatcher.iter().cloned());
    }
    module
}
