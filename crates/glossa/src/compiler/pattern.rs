//! Pattern compilation
//!
//! A pattern becomes either one template literal (string mode) or an array of
//! part records (parts mode). Both modes read variables through the same
//! [`Scope`], so dropping the markup records of the parts output and joining
//! the rest yields exactly the string-mode result.

use log::trace;

use crate::{
    compiler::{error::CompileError, variable_access::Scope},
    js::{Expr, Generator, TemplateElement, builder},
    model::{AttributeValue, Declaration, Markup, Pattern, PatternPart},
    parts::{MarkupNestingError, MarkupStack},
    types::{Compiled, PatternMode},
};

/// Compile a pattern against a bundle's declarations
pub fn compile_pattern(
    pattern: &Pattern,
    declarations: &[Declaration],
    mode: PatternMode,
) -> Result<Compiled<Pattern>, CompileError> {
    let scope = Scope::full(declarations)?;
    let expr = pattern_expr(pattern, &scope, mode)?;
    Ok(Compiled::new(
        Generator::default().expr(&expr),
        pattern.clone(),
    ))
}

/// Build the expression for a pattern in the given mode
///
/// Markup nesting is validated first, whatever the mode.
pub fn pattern_expr(pattern: &Pattern, scope: &Scope, mode: PatternMode) -> Result<Expr, CompileError> {
    validate_markup(pattern)?;
    trace!("Compiling pattern of {} part(s) in {mode} mode", pattern.len());
    match mode {
        PatternMode::String => string_mode(pattern, scope),
        PatternMode::Parts => parts_mode(pattern, scope),
    }
}

/// Check that start and end records nest like balanced tags
pub fn validate_markup(pattern: &Pattern) -> Result<(), MarkupNestingError> {
    let mut stack = MarkupStack::new();
    for part in pattern {
        match part {
            PatternPart::MarkupStart(markup) => stack.open(&markup.name),
            PatternPart::MarkupEnd(markup) => stack.close(&markup.name)?,
            _ => {}
        }
    }
    stack.finish()
}

/// Text runs are merged across elided markup, so escaping sees a `$` and a
/// following `{` together
fn string_mode(pattern: &Pattern, scope: &Scope) -> Result<Expr, CompileError> {
    let mut elements: Vec<TemplateElement> = Vec::with_capacity(pattern.len());
    for part in pattern {
        match part {
            PatternPart::Text { value } => match elements.last_mut() {
                Some(TemplateElement::Text(text)) => text.push_str(value),
                _ => elements.push(TemplateElement::Text(value.clone())),
            },
            PatternPart::Expression(expression) => {
                if let Some(annotation) = &expression.annotation {
                    trace!(
                        "Ignoring annotation `{}` on a pattern expression",
                        annotation.name
                    );
                }
                elements.push(TemplateElement::Interpolation(
                    scope.argument(&expression.arg)?,
                ));
            }
            // Markup only wraps content, the content itself is kept
            PatternPart::MarkupStart(_)
            | PatternPart::MarkupEnd(_)
            | PatternPart::MarkupStandalone(_) => {}
        }
    }
    Ok(builder::template(elements))
}

fn parts_mode(pattern: &Pattern, scope: &Scope) -> Result<Expr, CompileError> {
    let mut records = Vec::with_capacity(pattern.len());
    for part in pattern {
        let record = match part {
            PatternPart::Text { value } => builder::text_part(builder::string(value)),
            PatternPart::Expression(expression) => builder::text_part(builder::call(
                builder::ident("String"),
                vec![scope.argument(&expression.arg)?],
            )),
            PatternPart::MarkupStart(markup)
            | PatternPart::MarkupEnd(markup)
            | PatternPart::MarkupStandalone(markup) => markup_record(part.kind(), markup, scope)?,
        };
        records.push(record);
    }
    Ok(builder::array(records))
}

/// `{ type, name, options: { "k": v }, attributes: { "k": true | "v" } }`
fn markup_record(kind: &str, markup: &Markup, scope: &Scope) -> Result<Expr, CompileError> {
    let options = markup
        .options
        .iter()
        .map(|option| Ok((option.name.clone(), scope.argument(&option.value)?)))
        .collect::<Result<Vec<_>, CompileError>>()?;
    let attributes = markup
        .attributes
        .iter()
        .map(|attribute| {
            let value = match &attribute.value {
                AttributeValue::True => builder::boolean(true),
                AttributeValue::Literal(value) => builder::string(value),
            };
            (attribute.name.clone(), value)
        })
        .collect();

    Ok(builder::object(vec![
        ("type", builder::string(kind)),
        ("name", builder::string(&markup.name)),
        ("options", builder::quoted_object(options)),
        ("attributes", builder::quoted_object(attributes)),
    ]))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Argument, Expression};

    fn declarations() -> Vec<Declaration> {
        vec![
            Declaration::input("name"),
            Declaration::input("relationship"),
            Declaration::local("count", Expression::literal("3")),
        ]
    }

    #[test]
    fn test_string_mode_interpolates() {
        let pattern = vec![
            PatternPart::text("Hello "),
            PatternPart::variable("name"),
            PatternPart::text(", you have "),
            PatternPart::variable("count"),
            PatternPart::Expression(Expression::literal("!")),
        ];
        let compiled = compile_pattern(&pattern, &declarations(), PatternMode::String)
            .expect("pattern should compile");
        assert_eq!(
            compiled.code,
            "`Hello ${i?.name}, you have ${count}${\"!\"}`"
        );
        assert_eq!(compiled.node, pattern);
    }

    #[test]
    fn test_string_mode_escapes_text() {
        let pattern = vec![PatternPart::text("`Hello` \\ ${world}")];
        let compiled = compile_pattern(&pattern, &[], PatternMode::String)
            .expect("pattern should compile");
        assert_eq!(compiled.code, "`\\`Hello\\` \\\\ \\${world}`");
    }

    #[test]
    fn test_string_mode_elides_markup() {
        let pattern = vec![
            PatternPart::text("Read "),
            PatternPart::MarkupStart(Markup::new("link")),
            PatternPart::text("docs"),
            PatternPart::MarkupEnd(Markup::new("link")),
        ];
        let compiled = compile_pattern(&pattern, &[], PatternMode::String)
            .expect("pattern should compile");
        assert_eq!(compiled.code, "`Read docs`");
    }

    #[test]
    fn test_string_mode_merges_split_interpolation_opener() {
        let split = vec![PatternPart::text("cost: $"), PatternPart::text("{price}")];
        let across_markup = vec![
            PatternPart::text("cost: $"),
            PatternPart::MarkupStandalone(Markup::new("br")),
            PatternPart::text("{price}"),
        ];
        for pattern in [split, across_markup] {
            let compiled = compile_pattern(&pattern, &[], PatternMode::String)
                .expect("pattern should compile");
            assert_eq!(compiled.code, "`cost: \\${price}`");
        }
    }

    #[test]
    fn test_parts_mode_records() {
        let pattern = vec![
            PatternPart::text("Read "),
            PatternPart::MarkupStart(
                Markup::new("link")
                    .with_option("to", Argument::literal("/docs"))
                    .with_option("rel", Argument::variable("relationship"))
                    .with_attribute("track", AttributeValue::True)
                    .with_attribute("variant", AttributeValue::Literal("hero".to_string())),
            ),
            PatternPart::variable("name"),
            PatternPart::MarkupEnd(Markup::new("link")),
        ];
        let compiled = compile_pattern(&pattern, &declarations(), PatternMode::Parts)
            .expect("pattern should compile");
        assert_eq!(
            compiled.code,
            concat!(
                "[{ type: \"text\", value: \"Read \" }, ",
                "{ type: \"markup-start\", name: \"link\", options: { \"to\": \"/docs\", \"rel\": i?.relationship }, attributes: { \"track\": true, \"variant\": \"hero\" } }, ",
                "{ type: \"text\", value: String(i?.name) }, ",
                "{ type: \"markup-end\", name: \"link\", options: {}, attributes: {} }]"
            )
        );
    }

    #[test]
    fn test_unresolved_variable_fails() {
        let pattern = vec![PatternPart::variable("missing")];
        let error = compile_pattern(&pattern, &declarations(), PatternMode::String)
            .expect_err("unknown variable should fail");
        assert_eq!(
            error,
            CompileError::UnresolvedVariable {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_unresolved_markup_option_fails() {
        let pattern = vec![PatternPart::MarkupStandalone(
            Markup::new("icon").with_option("size", Argument::variable("size")),
        )];
        assert!(compile_pattern(&pattern, &declarations(), PatternMode::Parts).is_err());
    }

    #[test]
    fn test_markup_nesting_is_validated_in_both_modes() {
        let pattern = vec![
            PatternPart::MarkupStart(Markup::new("b")),
            PatternPart::MarkupEnd(Markup::new("i")),
        ];
        for mode in [PatternMode::String, PatternMode::Parts] {
            let error = compile_pattern(&pattern, &[], mode).expect_err("mismatch should fail");
            assert_eq!(
                error,
                CompileError::Markup(MarkupNestingError::Mismatched {
                    expected: "b".to_string(),
                    found: "i".to_string()
                })
            );
        }
    }
}
