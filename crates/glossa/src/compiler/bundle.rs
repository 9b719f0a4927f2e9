//! Bundle compilation
//!
//! Compiles every message of a bundle and builds the dispatcher: the exported
//! function that resolves the active locale once and delegates to the
//! matching per-locale message, falling back to the bundle id when nothing
//! applies.

use std::borrow::Cow;

use log::debug;

use crate::{
    analyzers::{
        InputTypeAnalyzer, MarkupSchemaAnalyzer,
        jsdoc::{DispatcherTypes, MESSAGE_PARTS, options_type},
        types::{InputMatchTypes, InputSignature, MarkupSchema},
    },
    compiler::{
        error::CompileError,
        message::{CompiledMessage, compile_message, sentinel},
    },
    fallback::FallbackMap,
    js::{Expr, Function, Generator, Item, Stmt, builder},
    model::{Bundle, Message, ProjectSettings},
    safe_id::{input_type_alias_name, to_safe_module_id},
    types::{Compiled, FxIndexMap, PatternMode},
};

/// Property of `globalThis` holding per-request message overrides
pub const SSR_OVERRIDES: &str = "__glossa_ssr";

/// Builds the expression that refers to a locale's compiled message
pub type MessageReference = fn(locale: &str, bundle_id: &str) -> Expr;

/// Inputs of [`compile_bundle`]
#[derive(Debug, Clone, Copy)]
pub struct BundleCompileArgs<'a> {
    pub bundle: &'a Bundle,
    /// Locales the dispatcher tests, in key order
    pub fallback_map: &'a FallbackMap,
    pub message_reference: MessageReference,
    pub settings: Option<&'a ProjectSettings>,
    /// Consult per-request overrides and track calls
    pub middleware_locale_splitting: bool,
}

/// A compiled bundle: dispatcher, messages and derived types
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledBundle {
    /// Dispatcher code next to the bundle it came from
    pub bundle: Compiled<Bundle>,
    /// Dispatcher declaration and, for unsafe ids, the export alias
    pub dispatcher: Vec<Item>,
    /// Compiled messages keyed by locale, in declaration order
    pub messages: FxIndexMap<String, CompiledMessage>,
    pub match_types: InputMatchTypes,
    pub signature: InputSignature,
    pub markup_schema: MarkupSchema,
    /// Binding name of the dispatcher and of every per-locale message
    pub safe_id: String,
    /// Name of the typedef describing the inputs
    pub input_type_alias: String,
}

impl CompiledBundle {
    pub fn id(&self) -> &str {
        &self.bundle.node.id
    }

    pub fn has_markup(&self) -> bool {
        self.bundle.node.has_markup()
    }
}

/// Compile a bundle's messages and dispatcher
pub fn compile_bundle(args: BundleCompileArgs<'_>) -> Result<CompiledBundle, CompileError> {
    let bundle = args.bundle;
    let safe_id = to_safe_module_id(&bundle.id);
    let input_type_alias = input_type_alias_name(&safe_id);

    let match_types = InputTypeAnalyzer::collect_match_types(bundle);
    let signature = InputTypeAnalyzer::analyze(bundle, &match_types);
    let markup_schema = MarkupSchemaAnalyzer::analyze(bundle, &signature);

    let mut messages = FxIndexMap::default();
    for message in &bundle.messages {
        if messages.contains_key(&message.locale) {
            return Err(CompileError::DuplicateLocale {
                locale: message.locale.clone(),
            }
            .in_bundle(&bundle.id, None, None));
        }
        let message = with_bundle_id(message, &bundle.id);
        let compiled = compile_message(
            &bundle.declarations,
            &message,
            &message.variants,
            &input_type_alias,
        )?;
        messages.insert(message.locale.clone(), compiled);
    }

    let fully_translated = args
        .settings
        .is_some_and(|settings| messages.len() == settings.locales.len());
    let dispatcher = Dispatcher {
        args: &args,
        safe_id: &safe_id,
        fully_translated,
        has_inputs: !signature.is_empty(),
    };
    let types = DispatcherTypes {
        input_type: input_type_alias.clone(),
        options_type: options_type(args.fallback_map.keys().map(String::as_str)),
        requires_inputs: !signature.is_empty(),
        markup_schema: markup_schema.render(),
    };
    let items = dispatcher.items(&types, bundle.has_markup());

    let generator = Generator::default();
    let code = items
        .iter()
        .map(|item| generator.item(item))
        .collect::<Vec<_>>()
        .join("\n");

    debug!(
        "Compiled bundle {} as `{safe_id}`: {} message(s), fully translated: {fully_translated}",
        bundle.id,
        messages.len()
    );

    Ok(CompiledBundle {
        bundle: Compiled::new(code, bundle.clone()),
        dispatcher: items,
        messages,
        match_types,
        signature,
        markup_schema,
        safe_id,
        input_type_alias,
    })
}

fn with_bundle_id<'a>(message: &'a Message, bundle_id: &str) -> Cow<'a, Message> {
    if message.bundle_id == bundle_id {
        Cow::Borrowed(message)
    } else {
        Cow::Owned(Message {
            bundle_id: bundle_id.to_string(),
            ..message.clone()
        })
    }
}

/// Builder for the locale dispatcher of one bundle
#[derive(Debug)]
struct Dispatcher<'a> {
    args: &'a BundleCompileArgs<'a>,
    safe_id: &'a str,
    fully_translated: bool,
    has_inputs: bool,
}

impl Dispatcher<'_> {
    fn items(&self, types: &DispatcherTypes, has_markup: bool) -> Vec<Item> {
        let bundle_id = &self.args.bundle.id;
        let string = self.function(PatternMode::String);
        let value = if has_markup {
            builder::assign_parts(
                builder::cast(types.function_type(), arrow(string)),
                builder::cast(types.parts_type(), arrow(self.function(PatternMode::Parts))),
            )
        } else {
            arrow(string)
        };

        let locales: Vec<&str> = self.args.fallback_map.keys().map(String::as_str).collect();
        let is_safe = self.safe_id == bundle_id.as_str();
        let mut items = vec![Item::Const {
            doc: Some(builder::doc(types.doc_lines(bundle_id, &locales))),
            no_side_effects: false,
            export: is_safe,
            name: self.safe_id.to_string(),
            init: builder::cast(types.exported_type(has_markup), value),
        }];
        if !is_safe {
            items.push(Item::ExportAlias {
                local: self.safe_id.to_string(),
                exported: bundle_id.clone(),
            });
        }
        items
    }

    fn function(&self, mode: PatternMode) -> Function {
        let inputs = if self.has_inputs {
            builder::param("inputs")
        } else {
            builder::param_with_default("inputs", builder::object(vec![]))
        };
        let options = builder::param_with_default("options", builder::object(vec![]));

        let mut body = Vec::new();
        if self.args.middleware_locale_splitting {
            body.push(self.server_override(mode));
        }
        body.push(builder::const_decl(
            "locale",
            builder::nullish_chain(
                builder::ident("experimentalStaticLocale"),
                vec![
                    builder::member(builder::ident("options"), "locale"),
                    builder::call(builder::ident("getLocale"), vec![]),
                ],
            ),
        ));
        if self.args.middleware_locale_splitting {
            body.push(builder::expr_stmt(builder::call(
                builder::ident("trackMessageCall"),
                vec![builder::string(self.safe_id), builder::ident("locale")],
            )));
        }
        body.extend(self.locale_branches(mode));

        Function {
            params: vec![inputs, options],
            body,
        }
    }

    /// One return per locale; the last is unconditional only when every
    /// locale has a message
    fn locale_branches(&self, mode: PatternMode) -> Vec<Stmt> {
        let locales: Vec<&String> = self.args.fallback_map.keys().collect();
        let mut stmts = Vec::with_capacity(locales.len() + 1);
        let unconditional_last = self.fully_translated && !locales.is_empty();

        for (index, locale) in locales.iter().enumerate() {
            let reference = (self.args.message_reference)(locale, &self.args.bundle.id);
            let value = match mode {
                PatternMode::String => call_with_inputs(reference),
                PatternMode::Parts => parts_or_text(reference),
            };
            if unconditional_last && index == locales.len() - 1 {
                stmts.push(builder::ret(value));
            } else {
                stmts.push(builder::if_return(
                    builder::strict_eq(builder::ident("locale"), builder::string(locale)),
                    value,
                ));
            }
        }

        if !unconditional_last {
            stmts.push(builder::ret(sentinel(&self.args.bundle.id, mode)));
        }
        stmts
    }

    /// Delegate to the request's override before any locale logic
    fn server_override(&self, mode: PatternMode) -> Stmt {
        let test = builder::and(
            builder::ident("experimentalMiddlewareLocaleSplitting"),
            builder::strict_eq(builder::ident("isServer"), builder::boolean(false)),
        );
        let server_message = builder::member(
            builder::member(builder::cast("any", builder::ident("globalThis")), SSR_OVERRIDES),
            self.safe_id,
        );

        let body = match mode {
            PatternMode::String => vec![builder::ret(call_with_inputs(server_message))],
            PatternMode::Parts => vec![
                builder::const_decl("serverMessage", server_message),
                builder::if_return(
                    has_parts_test(builder::ident("serverMessage")),
                    builder::cast(
                        MESSAGE_PARTS,
                        builder::call(
                            builder::member(builder::ident("serverMessage"), "parts"),
                            vec![builder::ident("inputs")],
                        ),
                    ),
                ),
                builder::ret(builder::cast(
                    MESSAGE_PARTS,
                    builder::array(vec![builder::text_part(call_with_inputs(builder::ident(
                        "serverMessage",
                    )))]),
                )),
            ],
        };
        builder::if_block(test, body)
    }
}

fn arrow(function: Function) -> Expr {
    Expr::Arrow(Box::new(function))
}

fn call_with_inputs(callee: Expr) -> Expr {
    builder::call(callee, vec![builder::ident("inputs")])
}

/// `typeof target.parts === "function"`
fn has_parts_test(target: Expr) -> Expr {
    builder::strict_eq(
        builder::type_of(builder::member(target, "parts")),
        builder::string("function"),
    )
}

/// Parts of a message when it has them, otherwise its string as one record
fn parts_or_text(reference: Expr) -> Expr {
    builder::conditional(
        has_parts_test(reference.clone()),
        call_with_inputs(builder::member(reference.clone(), "parts")),
        builder::array(vec![builder::text_part(call_with_inputs(reference))]),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        fallback::fallback_map,
        model::{Declaration, Markup, Match, PatternPart, Variant},
        output::message_reference,
    };

    fn greeting() -> Bundle {
        Bundle {
            id: "greeting".to_string(),
            declarations: vec![Declaration::input("name")],
            messages: vec![
                Message::new("greeting", "en").with_variant(Variant::new(
                    vec![],
                    vec![PatternPart::text("Hello "), PatternPart::variable("name")],
                )),
                Message::new("greeting", "de").with_variant(Variant::new(
                    vec![],
                    vec![PatternPart::text("Hallo "), PatternPart::variable("name")],
                )),
            ],
        }
    }

    fn compile(bundle: &Bundle, settings: &ProjectSettings, middleware: bool) -> CompiledBundle {
        let fallbacks = fallback_map(settings);
        compile_bundle(BundleCompileArgs {
            bundle,
            fallback_map: &fallbacks,
            message_reference,
            settings: Some(settings),
            middleware_locale_splitting: middleware,
        })
        .expect("bundle should compile")
    }

    #[test]
    fn test_fully_translated_last_branch_is_unconditional() {
        let compiled = compile(&greeting(), &ProjectSettings::new("en", &["en", "de"]), false);
        assert!(compiled.bundle.code.contains(
            "\tconst locale = experimentalStaticLocale ?? options.locale ?? getLocale()\n\tif (locale === \"en\") return __en.greeting(inputs)\n\treturn __de.greeting(inputs)\n})"
        ));
        assert!(compiled.bundle.code.starts_with("/**\n * Message \"greeting\" in 2 locales."));
        assert!(compiled.bundle.code.contains("export const greeting = "));
        assert!(!compiled.bundle.code.contains("trackMessageCall"));
        assert_eq!(compiled.messages.len(), 2);
        assert_eq!(compiled.input_type_alias, "Greeting_Inputs");
    }

    #[test]
    fn test_missing_translation_ends_with_sentinel() {
        let compiled = compile(
            &greeting(),
            &ProjectSettings::new("en", &["en", "de", "fr"]),
            false,
        );
        assert!(compiled.bundle.code.contains(
            "\tif (locale === \"fr\") return __fr.greeting(inputs)\n\treturn /** @type {LocalizedString} */ (\"greeting\")\n})"
        ));
    }

    #[test]
    fn test_middleware_wraps_dispatch() {
        let compiled = compile(&greeting(), &ProjectSettings::new("en", &["en", "de"]), true);
        let code = &compiled.bundle.code;
        assert!(code.contains(
            "\tif (experimentalMiddlewareLocaleSplitting && isServer === false) {\n\t\treturn /** @type {any} */ (globalThis).__glossa_ssr.greeting(inputs)\n\t}"
        ));
        assert!(code.contains("\ttrackMessageCall(\"greeting\", locale)\n"));
    }

    #[test]
    fn test_unsafe_id_is_aliased() {
        let mut bundle = greeting();
        bundle.id = "404-page".to_string();
        for message in &mut bundle.messages {
            message.bundle_id = bundle.id.clone();
        }
        let compiled = compile(&bundle, &ProjectSettings::new("en", &["en", "de"]), false);
        assert_eq!(compiled.safe_id, "_404_page");
        assert!(compiled.bundle.code.contains("\nconst _404_page = "));
        assert!(
            compiled
                .bundle
                .code
                .ends_with("\nexport { _404_page as \"404-page\" }")
        );
    }

    #[test]
    fn test_markup_bundle_gets_parts_dispatcher() {
        let mut bundle = greeting();
        bundle.messages[1] = Message::new("greeting", "de").with_variant(Variant::new(
            vec![],
            vec![
                PatternPart::MarkupStart(Markup::new("b")),
                PatternPart::variable("name"),
                PatternPart::MarkupEnd(Markup::new("b")),
            ],
        ));
        let compiled = compile(&bundle, &ProjectSettings::new("en", &["en", "de"]), false);
        assert!(compiled.has_markup());
        assert!(!compiled.messages["en"].function.has_parts());
        assert!(compiled.messages["de"].function.has_parts());
        assert!(compiled.bundle.code.contains(
            "return typeof __de.greeting.parts === \"function\" ? __de.greeting.parts(inputs) : [{ type: \"text\", value: __de.greeting(inputs) }]"
        ));
        assert!(
            compiled
                .bundle
                .code
                .contains("MessageMetadata<Greeting_Inputs, { locale?: \"en\" | \"de\" }, { b: { options: {}; attributes: {}; children: true } }>")
        );
    }

    #[test]
    fn test_duplicate_locale_is_an_error() {
        let mut bundle = greeting();
        bundle.messages.push(bundle.messages[0].clone());
        let fallbacks = fallback_map(&ProjectSettings::new("en", &["en", "de"]));
        let error = compile_bundle(BundleCompileArgs {
            bundle: &bundle,
            fallback_map: &fallbacks,
            message_reference,
            settings: None,
            middleware_locale_splitting: false,
        })
        .expect_err("duplicate locale should fail");
        assert_eq!(
            error.root_cause(),
            &CompileError::DuplicateLocale {
                locale: "en".to_string()
            }
        );
        assert!(error.to_string().contains("`en`"));
    }

    #[test]
    fn test_selector_literals_narrow_signature() {
        let bundle = Bundle {
            id: "items".to_string(),
            declarations: vec![Declaration::input("count")],
            messages: vec![
                Message::new("items", "en")
                    .with_variant(Variant::new(
                        vec![Match::literal("count", "1")],
                        vec![PatternPart::text("one")],
                    ))
                    .with_variant(Variant::new(
                        vec![Match::literal("count", "2")],
                        vec![PatternPart::text("two")],
                    )),
            ],
        };
        let compiled = compile(&bundle, &ProjectSettings::new("en", &["en"]), false);
        assert_eq!(compiled.signature.render(), "{ count: \"1\" | \"2\" }");
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let settings = ProjectSettings::new("en", &["en", "de", "fr"]);
        let first = compile(&greeting(), &settings, true);
        let second = compile(&greeting(), &settings, true);
        assert_eq!(first.bundle.code, second.bundle.code);
        assert_eq!(
            first.messages["de"].compiled.code,
            second.messages["de"].compiled.code
        );
    }
}
