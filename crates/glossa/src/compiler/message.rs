//! Message compilation
//!
//! One locale's message becomes one arrow function taking the inputs object.
//! Locals are bound first, then the variants are tried in declaration order.
//! Messages with markup additionally get a parts function, attached to the
//! string function as a `.parts` property in the generated code and modelled
//! here as [`MessageFunction::Markup`].

use log::debug;

use crate::{
    analyzers::jsdoc::{
        LOCALIZED_STRING, MESSAGE_PARTS, message_function_type, message_parts_type,
        message_with_parts_type,
    },
    compiler::{
        error::CompileError,
        local_variable::compile_locals,
        pattern::pattern_expr,
        variable_access::{INPUTS_PARAM, Scope},
    },
    js::{Expr, Function, Generator, Stmt, builder},
    model::{Declaration, Match, Message, Variant},
    types::{Compiled, PatternMode},
};

/// A compiled per-locale message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageFunction {
    /// Only renders to a string
    Plain(Function),
    /// Renders to a string or to a parts sequence
    Markup { string: Function, parts: Function },
}

impl MessageFunction {
    pub fn string(&self) -> &Function {
        match self {
            Self::Plain(string) | Self::Markup { string, .. } => string,
        }
    }

    /// The parts capability, present only for markup messages
    pub fn parts(&self) -> Option<&Function> {
        match self {
            Self::Plain(_) => None,
            Self::Markup { parts, .. } => Some(parts),
        }
    }

    pub fn has_parts(&self) -> bool {
        self.parts().is_some()
    }

    /// The exported value, typed with `input_type`
    pub fn to_expr(&self, input_type: &str) -> Expr {
        match self {
            Self::Plain(string) => builder::cast(
                message_function_type(input_type),
                Expr::Arrow(Box::new(string.clone())),
            ),
            Self::Markup { string, parts } => builder::cast(
                message_with_parts_type(input_type),
                builder::assign_parts(
                    builder::cast(
                        message_function_type(input_type),
                        Expr::Arrow(Box::new(string.clone())),
                    ),
                    builder::cast(
                        message_parts_type(input_type),
                        Expr::Arrow(Box::new(parts.clone())),
                    ),
                ),
            ),
        }
    }
}

/// Output of [`compile_message`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMessage {
    pub function: MessageFunction,
    /// [`MessageFunction::to_expr`] of `function`
    pub value: Expr,
    pub compiled: Compiled<Message>,
}

impl CompiledMessage {
    pub fn locale(&self) -> &str {
        &self.compiled.node.locale
    }
}

/// Compile the variants of one locale's message
///
/// `input_type` is the JSDoc type of the inputs object, usually the bundle's
/// typedef alias.
pub fn compile_message(
    declarations: &[Declaration],
    message: &Message,
    variants: &[Variant],
    input_type: &str,
) -> Result<CompiledMessage, CompileError> {
    let locate = |variant: Option<String>| {
        move |error: CompileError| {
            error.in_bundle(&message.bundle_id, Some(&message.locale), variant.clone())
        }
    };

    if variants.is_empty() {
        return Err(locate(None)(CompileError::EmptyMessage));
    }

    let (locals, scope) = compile_locals(declarations, &message.locale).map_err(locate(None))?;
    let has_markup = variants.iter().any(Variant::has_markup);
    let params = if scope.has_inputs() {
        vec![builder::param(INPUTS_PARAM)]
    } else {
        Vec::new()
    };

    let body = |mode: PatternMode| -> Result<Function, CompileError> {
        let mut body = locals.clone();
        body.extend(variant_returns(message, variants, &scope, mode)?);
        Ok(Function {
            params: params.clone(),
            body,
        })
    };

    let string = body(PatternMode::String)?;
    let function = if has_markup {
        MessageFunction::Markup {
            string,
            parts: body(PatternMode::Parts)?,
        }
    } else {
        MessageFunction::Plain(string)
    };

    debug!(
        "Compiled message {} ({}) with {} variant(s){}",
        message.bundle_id,
        message.locale,
        variants.len(),
        if has_markup { " and parts" } else { "" }
    );

    let value = function.to_expr(input_type);
    let code = Generator::default().expr(&value);
    Ok(CompiledMessage {
        function,
        value,
        compiled: Compiled::new(code, message.clone()),
    })
}

/// Return statements for every variant, plus the sentinel when nothing
/// is guaranteed to match
fn variant_returns(
    message: &Message,
    variants: &[Variant],
    scope: &Scope,
    mode: PatternMode,
) -> Result<Vec<Stmt>, CompileError> {
    let mut stmts = Vec::with_capacity(variants.len() + 1);
    let mut has_catch_all = false;

    for (index, variant) in variants.iter().enumerate() {
        let located = |error: CompileError| {
            error.in_bundle(
                &message.bundle_id,
                Some(&message.locale),
                Some(variant.label(index)),
            )
        };
        let conditions = match_conditions(&variant.matches, scope).map_err(located)?;
        let value = typed_result(pattern_expr(&variant.pattern, scope, mode).map_err(located)?, mode);

        if variants.len() == 1 {
            stmts.push(builder::ret(value));
            return Ok(stmts);
        }
        match builder::and_all(conditions) {
            Some(test) => stmts.push(builder::if_return(test, value)),
            None => {
                has_catch_all = true;
                stmts.push(builder::ret(value));
            }
        }
    }

    if !has_catch_all {
        stmts.push(builder::ret(sentinel(&message.bundle_id, mode)));
    }
    Ok(stmts)
}

/// `key == "value"` per literal match; catch-all matches add nothing
fn match_conditions(matches: &[Match], scope: &Scope) -> Result<Vec<Expr>, CompileError> {
    let mut conditions = Vec::new();
    for selector in matches {
        let access = scope.resolve(selector.key())?;
        if let Match::LiteralMatch { value, .. } = selector {
            conditions.push(builder::loose_eq(access, builder::string(value)));
        }
    }
    Ok(conditions)
}

fn typed_result(expr: Expr, mode: PatternMode) -> Expr {
    match mode {
        PatternMode::String => builder::cast(LOCALIZED_STRING, expr),
        PatternMode::Parts => builder::cast(MESSAGE_PARTS, expr),
    }
}

/// The bundle id stands in for a message nothing matched
pub(crate) fn sentinel(bundle_id: &str, mode: PatternMode) -> Expr {
    match mode {
        PatternMode::String => typed_result(builder::string(bundle_id), mode),
        PatternMode::Parts => typed_result(
            builder::array(vec![builder::text_part(builder::string(bundle_id))]),
            mode,
        ),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Markup, PatternPart};

    fn items_message(variants: Vec<Variant>) -> Message {
        Message {
            variants,
            ..Message::new("items", "en")
        }
    }

    fn render(function: &Function) -> String {
        Generator::default().expr(&Expr::Arrow(Box::new(function.clone())))
    }

    #[test]
    fn test_single_variant_has_no_branching() {
        let message = items_message(vec![Variant::new(
            vec![],
            vec![PatternPart::text("Hello "), PatternPart::variable("name")],
        )]);
        let compiled = compile_message(
            &[Declaration::input("name")],
            &message,
            &message.variants,
            "Items_Inputs",
        )
        .expect("message should compile");

        assert!(!compiled.function.has_parts());
        assert_eq!(
            compiled.compiled.code,
            "/** @type {(inputs: Items_Inputs) => LocalizedString} */ ((i) => {\n\treturn /** @type {LocalizedString} */ (`Hello ${i?.name}`)\n})"
        );
        assert_eq!(compiled.compiled.node, message);
    }

    #[test]
    fn test_multiple_variants_in_order() {
        let message = items_message(vec![
            Variant::new(
                vec![Match::literal("count", "1")],
                vec![PatternPart::text("one item")],
            ),
            Variant::new(
                vec![],
                vec![PatternPart::variable("count"), PatternPart::text(" items")],
            ),
        ]);
        let compiled = compile_message(
            &[Declaration::input("count")],
            &message,
            &message.variants,
            "{}",
        )
        .expect("message should compile");

        assert_eq!(
            render(compiled.function.string()),
            "(i) => {\n\tif (i?.count == \"1\") return /** @type {LocalizedString} */ (`one item`)\n\treturn /** @type {LocalizedString} */ (`${i?.count} items`)\n}"
        );
    }

    #[test]
    fn test_sentinel_without_catch_all() {
        let message = items_message(vec![
            Variant::new(vec![Match::literal("count", "1")], vec![PatternPart::text("one")]),
            Variant::new(vec![Match::literal("count", "2")], vec![PatternPart::text("two")]),
        ]);
        let compiled = compile_message(
            &[Declaration::input("count")],
            &message,
            &message.variants,
            "{}",
        )
        .expect("message should compile");

        let rendered = render(compiled.function.string());
        assert!(rendered.ends_with("return /** @type {LocalizedString} */ (\"items\")\n}"));
    }

    #[test]
    fn test_markup_adds_parts_function() {
        let message = items_message(vec![
            Variant::new(
                vec![Match::literal("count", "1")],
                vec![
                    PatternPart::MarkupStart(Markup::new("b")),
                    PatternPart::text("one"),
                    PatternPart::MarkupEnd(Markup::new("b")),
                ],
            ),
            Variant::new(vec![Match::catch_all("count")], vec![PatternPart::text("many")]),
        ]);
        let compiled = compile_message(
            &[Declaration::input("count")],
            &message,
            &message.variants,
            "{}",
        )
        .expect("message should compile");

        let parts = compiled.function.parts().expect("markup message has parts");
        assert_eq!(
            render(parts),
            "(i) => {\n\tif (i?.count == \"1\") return /** @type {import('../runtime.js').MessagePart[]} */ ([{ type: \"markup-start\", name: \"b\", options: {}, attributes: {} }, { type: \"text\", value: \"one\" }, { type: \"markup-end\", name: \"b\", options: {}, attributes: {} }])\n\treturn /** @type {import('../runtime.js').MessagePart[]} */ ([{ type: \"text\", value: \"many\" }])\n}"
        );
        assert!(compiled.compiled.code.contains("Object.assign("));
    }

    #[test]
    fn test_locals_precede_variants() {
        let message = items_message(vec![
            Variant::new(
                vec![Match::literal("size", "big")],
                vec![PatternPart::text("big")],
            ),
            Variant::new(vec![], vec![PatternPart::text("small")]),
        ]);
        let declarations = vec![Declaration::local(
            "size",
            crate::model::Expression::literal("big"),
        )];
        let compiled = compile_message(&declarations, &message, &message.variants, "{}")
            .expect("message should compile");
        assert_eq!(
            render(compiled.function.string()),
            "() => {\n\tconst size = \"big\"\n\tif (size == \"big\") return /** @type {LocalizedString} */ (`big`)\n\treturn /** @type {LocalizedString} */ (`small`)\n}"
        );
    }

    #[test]
    fn test_zero_variants_is_rejected() {
        let message = items_message(vec![]);
        let error = compile_message(&[], &message, &[], "{}").expect_err("should fail");
        assert_eq!(error.root_cause(), &CompileError::EmptyMessage);
    }

    #[test]
    fn test_unresolved_match_key_names_the_variant() {
        let message = items_message(vec![
            Variant::new(vec![Match::literal("count", "1")], vec![PatternPart::text("one")]),
            Variant::new(vec![], vec![PatternPart::text("many")]),
        ]);
        let error = compile_message(&[], &message, &message.variants, "{}")
            .expect_err("undeclared selector should fail");
        assert_eq!(
            error.to_string(),
            "bundle `items` (locale `en`, variant #0): variable `count` is not declared"
        );
    }
}
