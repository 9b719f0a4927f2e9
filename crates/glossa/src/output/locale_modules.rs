//! Per-locale message modules
//!
//! Every locale module exports one binding per bundle so the dispatchers can
//! reference `__<locale>.<bundle>` unconditionally. A bundle without a
//! message for the locale is re-exported from the fallback locale's module,
//! or stubbed to return the bundle id when there is no fallback.

use log::trace;

use crate::{
    analyzers::jsdoc::{LOCALIZED_STRING, LOCALIZED_STRING_IMPORT, message_function_type},
    compiler::{CompiledBundle, message::sentinel, variable_access::REGISTRY},
    js::{Item, Module, builder},
    output::REGISTRY_SOURCE,
    types::{FxIndexSet, PatternMode},
};

/// Build `messages/<locale>.js`
pub fn generate_locale_module(
    compiled_bundles: &[CompiledBundle],
    locale: &str,
    fallback: Option<&str>,
) -> Module {
    let mut body = Module::new();
    let mut typedefs: Vec<Item> = Vec::new();
    let mut emitted_aliases = FxIndexSet::default();

    for compiled in compiled_bundles {
        if emitted_aliases.insert(compiled.input_type_alias.as_str()) {
            typedefs.push(builder::typedef(
                compiled.signature.render(),
                &compiled.input_type_alias,
            ));
        }

        if let Some(message) = compiled.messages.get(locale) {
            body.push(builder::export_const(&compiled.safe_id, message.value.clone()));
            continue;
        }
        match fallback {
            Some(fallback) => {
                trace!("{locale}: {} falls back to {fallback}", compiled.id());
                body.push(builder::re_export(
                    &[compiled.safe_id.as_str()],
                    &format!("./{fallback}.js"),
                ));
            }
            None => {
                trace!("{locale}: {} has no message, stubbing", compiled.id());
                body.push(builder::export_const(
                    &compiled.safe_id,
                    builder::cast(
                        message_function_type(&compiled.input_type_alias),
                        builder::arrow(
                            vec![],
                            vec![builder::ret(sentinel(compiled.id(), PatternMode::String))],
                        ),
                    ),
                ));
            }
        }
    }

    let mut module = Module::new();
    if body.references(REGISTRY) {
        module.push(builder::import_namespace(REGISTRY, REGISTRY_SOURCE));
    }
    if body.mentions_type(LOCALIZED_STRING) {
        module.push(builder::typedef(LOCALIZED_STRING_IMPORT, LOCALIZED_STRING));
        module.items.extend(typedefs);
    }
    module.items.extend(body.items);
    module
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        compiler::{BundleCompileArgs, compile_bundle},
        fallback::fallback_map,
        js::Generator,
        model::{Bundle, Declaration, Expression, FunctionReference, Message, PatternPart, ProjectSettings, Variant},
        output::message_reference,
    };

    fn compile(bundle: &Bundle, settings: &ProjectSettings) -> CompiledBundle {
        compile_bundle(BundleCompileArgs {
            bundle,
            fallback_map: &fallback_map(settings),
            message_reference,
            settings: Some(settings),
            middleware_locale_splitting: false,
        })
        .expect("bundle should compile")
    }

    fn hello() -> Bundle {
        Bundle {
            id: "hello".to_string(),
            declarations: vec![],
            messages: vec![Message::new("hello", "en")
                .with_variant(Variant::new(vec![], vec![PatternPart::text("Hello")]))],
        }
    }

    #[test]
    fn test_missing_message_reexports_fallback() {
        let settings = ProjectSettings::new("en", &["en", "de"]);
        let compiled = compile(&hello(), &settings);
        let module = generate_locale_module(&[compiled], "de", Some("en"));
        assert_eq!(
            Generator::default().module(&module),
            "export { hello } from \"./en.js\"\n"
        );
    }

    #[test]
    fn test_missing_message_without_fallback_is_stubbed() {
        let settings = ProjectSettings::new("en", &["en", "de"]);
        let compiled = compile(&hello(), &settings);
        let module = generate_locale_module(&[compiled], "de", None);
        assert_eq!(
            Generator::default().module(&module),
            concat!(
                "/** @typedef {import('../runtime.js').LocalizedString} LocalizedString */\n",
                "/** @typedef {{}} Hello_Inputs */\n",
                "\n",
                "export const hello = /** @type {(inputs: Hello_Inputs) => LocalizedString} */ (() => {\n",
                "\treturn /** @type {LocalizedString} */ (\"hello\")\n",
                "})\n"
            )
        );
    }

    #[test]
    fn test_registry_import_only_when_used() {
        let settings = ProjectSettings::new("en", &["en"]);
        let plain = generate_locale_module(&[compile(&hello(), &settings)], "en", None);
        assert!(!plain.references(REGISTRY));
        assert!(!matches!(plain.items[0], Item::ImportNamespace { .. }));

        let formatted = Bundle {
            id: "count".to_string(),
            declarations: vec![
                Declaration::input("n"),
                Declaration::local(
                    "formatted",
                    Expression::variable("n").annotated(FunctionReference::new("number")),
                ),
            ],
            messages: vec![Message::new("count", "en").with_variant(Variant::new(
                vec![],
                vec![PatternPart::variable("formatted")],
            ))],
        };
        let module = generate_locale_module(&[compile(&formatted, &settings)], "en", None);
        let rendered = Generator::default().module(&module);
        assert!(rendered.starts_with("import * as registry from \"../registry.js\"\n"));
        assert!(rendered.contains("const formatted = registry.number(\"en\", i?.n, {})"));
    }
}
