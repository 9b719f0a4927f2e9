//! Factory functions for synthetic JavaScript nodes
//!
//! Every node the compiler emits is created through these helpers so the
//! call sites read close to the code they produce.

use super::{
    BinaryOp, Doc, Expr, Function, Item, Param, Property, PropertyKey, Stmt, TemplateElement,
};
use crate::safe_id::is_valid_identifier;

/// Create a binding reference: `name`
pub fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_string())
}

/// Create a string literal: `"value"`
pub fn string(value: &str) -> Expr {
    Expr::Str(value.to_string())
}

/// Create a boolean literal
pub fn boolean(value: bool) -> Expr {
    Expr::Bool(value)
}

/// Create a template literal from its elements
pub fn template(elements: Vec<TemplateElement>) -> Expr {
    Expr::Template(elements)
}

/// Choose the property form for a name: bare when possible, quoted otherwise
pub fn key(name: &str) -> PropertyKey {
    if is_valid_identifier(name) {
        PropertyKey::Ident(name.to_string())
    } else {
        PropertyKey::Quoted(name.to_string())
    }
}

/// Create a property access: `object.name` or `object["na me"]`
pub fn member(object: Expr, name: &str) -> Expr {
    Expr::Member {
        object: Box::new(object),
        property: key(name),
        optional: false,
    }
}

/// Create a null-safe property access: `object?.name` or `object?.["na me"]`
pub fn optional_member(object: Expr, name: &str) -> Expr {
    Expr::Member {
        object: Box::new(object),
        property: key(name),
        optional: true,
    }
}

/// Create a call: `callee(args...)`
pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        args,
    }
}

/// Create an object literal with bare keys where possible: `{ type: "text" }`
pub fn object(entries: Vec<(&str, Expr)>) -> Expr {
    Expr::Object(
        entries
            .into_iter()
            .map(|(name, value)| Property {
                key: key(name),
                value,
            })
            .collect(),
    )
}

/// Create an object literal whose keys are always quoted: `{ "to": "/docs" }`
pub fn quoted_object(entries: Vec<(String, Expr)>) -> Expr {
    Expr::Object(
        entries
            .into_iter()
            .map(|(name, value)| Property {
                key: PropertyKey::Quoted(name),
                value,
            })
            .collect(),
    )
}

/// Create an array literal
pub fn array(items: Vec<Expr>) -> Expr {
    Expr::Array(items)
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// `left == right`
pub fn loose_eq(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::LooseEq, left, right)
}

/// `left === right`
pub fn strict_eq(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::StrictEq, left, right)
}

/// `left && right`
pub fn and(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::And, left, right)
}

/// Fold conditions with `&&`; `None` for an empty list
pub fn and_all(conditions: Vec<Expr>) -> Option<Expr> {
    conditions
        .into_iter()
        .reduce(and)
}

/// Fold operands with `??`
pub fn nullish_chain(first: Expr, rest: Vec<Expr>) -> Expr {
    rest.into_iter()
        .fold(first, |left, right| binary(BinaryOp::Nullish, left, right))
}

/// `test ? consequent : alternate`
pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Expr {
    Expr::Conditional {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
    }
}

/// `typeof expr`
pub fn type_of(expr: Expr) -> Expr {
    Expr::Typeof(Box::new(expr))
}

/// `/** @type {ty} */ (expr)`
pub fn cast(ty: impl Into<String>, expr: Expr) -> Expr {
    Expr::Cast {
        ty: ty.into(),
        expr: Box::new(expr),
    }
}

/// `/* @__PURE__ */ expr`
pub fn pure(expr: Expr) -> Expr {
    Expr::Pure(Box::new(expr))
}

/// An arrow function expression
pub fn arrow(params: Vec<Param>, body: Vec<Stmt>) -> Expr {
    Expr::Arrow(Box::new(Function { params, body }))
}

/// A plain parameter
pub fn param(name: &str) -> Param {
    Param {
        name: name.to_string(),
        default: None,
    }
}

/// A parameter with a default value: `name = default`
pub fn param_with_default(name: &str, default: Expr) -> Param {
    Param {
        name: name.to_string(),
        default: Some(default),
    }
}

/// `const name = init`
pub fn const_decl(name: &str, init: Expr) -> Stmt {
    Stmt::Const {
        name: name.to_string(),
        init,
    }
}

/// `return expr`
pub fn ret(expr: Expr) -> Stmt {
    Stmt::Return(expr)
}

/// `if (test) return expr`
pub fn if_return(test: Expr, expr: Expr) -> Stmt {
    Stmt::If {
        test,
        then: Box::new(Stmt::Return(expr)),
    }
}

/// `if (test) { body }`
pub fn if_block(test: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::If {
        test,
        then: Box::new(Stmt::Block(body)),
    }
}

/// An expression statement
pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

/// `{ type: "text", value: <value> }`
pub fn text_part(value: Expr) -> Expr {
    object(vec![("type", string("text")), ("value", value)])
}

/// `Object.assign(target, { parts: parts })`, marked pure
pub fn assign_parts(target: Expr, parts: Expr) -> Expr {
    pure(call(
        member(ident("Object"), "assign"),
        vec![target, object(vec![("parts", parts)])],
    ))
}

/// A JSDoc block from its lines
pub fn doc(lines: Vec<String>) -> Doc {
    Doc { lines }
}

/// `import { names } from "source"`
pub fn import(names: &[&str], source: &str) -> Item {
    Item::Import {
        names: names.iter().map(|name| (*name).to_string()).collect(),
        source: source.to_string(),
    }
}

/// `import * as alias from "source"`
pub fn import_namespace(alias: &str, source: &str) -> Item {
    Item::ImportNamespace {
        alias: alias.to_string(),
        source: source.to_string(),
    }
}

/// `/** @typedef {ty} name */`
pub fn typedef(ty: impl Into<String>, name: &str) -> Item {
    Item::Typedef {
        ty: ty.into(),
        name: name.to_string(),
    }
}

/// `export const name = init`
pub fn export_const(name: &str, init: Expr) -> Item {
    Item::Const {
        doc: None,
        no_side_effects: false,
        export: true,
        name: name.to_string(),
        init,
    }
}

/// `export { names } from "source"`
pub fn re_export(names: &[&str], source: &str) -> Item {
    Item::ReExport {
        names: names.iter().map(|name| (*name).to_string()).collect(),
        source: source.to_string(),
    }
}
