//! Local variable compilation
//!
//! Locals are bound once at the top of every per-locale message function, in
//! declaration order. A local sees the inputs and the locals declared before
//! it. Annotated locals call into the formatting registry with the message's
//! locale: `const n = registry.plural("en", i?.count, { type: "ordinal" })`.

use crate::{
    compiler::{
        error::CompileError,
        variable_access::{REGISTRY, Scope},
    },
    js::{Expr, Stmt, builder},
    model::{Declaration, Expression},
};

/// Bindings of every local plus the scope patterns are compiled in
pub fn compile_locals(
    declarations: &[Declaration],
    locale: &str,
) -> Result<(Vec<Stmt>, Scope), CompileError> {
    let mut scope = Scope::inputs(declarations);
    let mut stmts = Vec::new();
    for declaration in declarations {
        if let Declaration::LocalVariable { name, value } = declaration {
            let init = compile_local_value(value, locale, &scope)?;
            scope.declare_local(name)?;
            stmts.push(builder::const_decl(name, init));
        }
    }
    Ok((stmts, scope))
}

/// The initializer of one local
pub fn compile_local_value(
    value: &Expression,
    locale: &str,
    scope: &Scope,
) -> Result<Expr, CompileError> {
    let arg = scope.argument(&value.arg)?;
    let Some(function) = &value.annotation else {
        return Ok(arg);
    };

    let mut options = Vec::with_capacity(function.options.len());
    for option in &function.options {
        options.push((option.name.as_str(), scope.argument(&option.value)?));
    }
    Ok(builder::call(
        builder::member(builder::ident(REGISTRY), &function.name),
        vec![builder::string(locale), arg, builder::object(options)],
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        js::Generator,
        model::{Argument, FunctionReference},
    };

    fn render(stmts: &[Stmt]) -> Vec<String> {
        let generator = Generator::default();
        stmts.iter().map(|stmt| generator.stmt(stmt)).collect()
    }

    #[test]
    fn test_annotated_local_calls_registry() {
        let declarations = vec![
            Declaration::input("count"),
            Declaration::local(
                "countPlural",
                Expression::variable("count").annotated(
                    FunctionReference::new("plural")
                        .with_option("type", Argument::literal("ordinal")),
                ),
            ),
            Declaration::local("copy", Expression::variable("countPlural")),
        ];
        let (stmts, scope) = compile_locals(&declarations, "en").expect("locals should compile");
        assert_eq!(
            render(&stmts),
            vec![
                "const countPlural = registry.plural(\"en\", i?.count, { type: \"ordinal\" })",
                "const copy = countPlural",
            ]
        );
        assert!(scope.lookup("copy").is_some());
    }

    #[test]
    fn test_local_cannot_see_later_locals() {
        let declarations = vec![
            Declaration::local("first", Expression::variable("second")),
            Declaration::local("second", Expression::literal("x")),
        ];
        let error = compile_locals(&declarations, "en").expect_err("forward reference should fail");
        assert_eq!(
            error,
            CompileError::UnresolvedVariable {
                name: "second".to_string()
            }
        );
    }

    #[test]
    fn test_unannotated_literal_local() {
        let (stmts, _) = compile_locals(&[Declaration::local("x", Expression::literal("a"))], "de")
            .expect("local should compile");
        assert_eq!(render(&stmts), vec!["const x = \"a\""]);
    }
}
