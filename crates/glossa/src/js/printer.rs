//! Source generation for the JavaScript tree
//!
//! The [`Generator`] turns [`Module`]s, items, statements and expressions into
//! source text. Output depends only on the tree, so compiling the same input
//! twice yields byte-identical files.

use std::fmt::Write;

use cow_utils::CowUtils;

use super::{
    BinaryOp, Doc, Expr, Function, Item, Module, Param, Property, PropertyKey, Stmt,
    TemplateElement,
};

/// Quote a string as a double-quoted JavaScript literal
///
/// Equivalent to `JSON.stringify` for strings, plus escapes for the line and
/// paragraph separators so the literal is safe in any script context.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escape text for the inside of a template literal
///
/// Backslash, backtick and the `${` interpolation opener are each escaped
/// independently. Carriage returns are escaped because template literals
/// normalize raw line endings.
pub fn escape_template_literal(text: &str) -> String {
    text.cow_replace("\\", "\\\\")
        .cow_replace("`", "\\`")
        .cow_replace("${", "\\${")
        .cow_replace("\r", "\\r")
        .into_owned()
}

/// Keep arbitrary text from terminating a block comment
pub fn comment_safe(text: &str) -> String {
    text.cow_replace("*/", "*\\/").into_owned()
}

/// Serializes the JavaScript tree
#[derive(Debug, Clone)]
pub struct Generator {
    indent: String,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new("\t")
    }
}

impl Generator {
    pub fn new(indent: &str) -> Self {
        Self {
            indent: indent.to_string(),
        }
    }

    /// Render a whole module, one item per line and a blank line before
    /// every declaration
    pub fn module(&self, module: &Module) -> String {
        let mut out = String::new();
        for (index, item) in module.items.iter().enumerate() {
            if index > 0 {
                out.push('\n');
                if matches!(item, Item::Const { .. }) {
                    out.push('\n');
                }
            }
            self.write_item(&mut out, item);
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn item(&self, item: &Item) -> String {
        let mut out = String::new();
        self.write_item(&mut out, item);
        out
    }

    pub fn stmt(&self, stmt: &Stmt) -> String {
        let mut out = String::new();
        self.write_stmt(&mut out, stmt, 0);
        out
    }

    pub fn expr(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, expr, 0);
        out
    }

    fn push_indent(&self, out: &mut String, level: usize) {
        for _ in 0..level {
            out.push_str(&self.indent);
        }
    }

    fn write_item(&self, out: &mut String, item: &Item) {
        match item {
            Item::Import { names, source } => {
                let _ = write!(
                    out,
                    "import {{ {} }} from {}",
                    names.join(", "),
                    string_literal(source)
                );
            }
            Item::ImportNamespace { alias, source } => {
                let _ = write!(out, "import * as {alias} from {}", string_literal(source));
            }
            Item::Typedef { ty, name } => {
                let _ = write!(out, "/** @typedef {{{}}} {name} */", comment_safe(ty));
            }
            Item::Const {
                doc,
                no_side_effects,
                export,
                name,
                init,
            } => {
                if let Some(doc) = doc {
                    write_doc(out, doc);
                }
                if *no_side_effects {
                    out.push_str("/* @__NO_SIDE_EFFECTS__ */\n");
                }
                if *export {
                    out.push_str("export ");
                }
                let _ = write!(out, "const {name} = ");
                self.write_expr(out, init, 0);
            }
            Item::ExportAlias { local, exported } => {
                let _ = write!(out, "export {{ {local} as {} }}", string_literal(exported));
            }
            Item::ReExport { names, source } => {
                let _ = write!(
                    out,
                    "export {{ {} }} from {}",
                    names.join(", "),
                    string_literal(source)
                );
            }
            Item::ReExportAll { alias, source } => match alias {
                Some(alias) => {
                    let _ = write!(out, "export * as {alias} from {}", string_literal(source));
                }
                None => {
                    let _ = write!(out, "export * from {}", string_literal(source));
                }
            },
        }
    }

    fn write_stmt(&self, out: &mut String, stmt: &Stmt, level: usize) {
        match stmt {
            Stmt::Const { name, init } => {
                let _ = write!(out, "const {name} = ");
                self.write_expr(out, init, level);
            }
            Stmt::Return(expr) => {
                out.push_str("return ");
                self.write_expr(out, expr, level);
            }
            Stmt::If { test, then } => {
                out.push_str("if (");
                self.write_expr(out, test, level);
                out.push_str(") ");
                self.write_stmt(out, then, level);
            }
            Stmt::Block(stmts) => self.write_block(out, stmts, level),
            Stmt::Expr(expr) => self.write_expr(out, expr, level),
        }
    }

    fn write_block(&self, out: &mut String, stmts: &[Stmt], level: usize) {
        if stmts.is_empty() {
            out.push_str("{}");
            return;
        }
        out.push_str("{\n");
        for stmt in stmts {
            self.push_indent(out, level + 1);
            self.write_stmt(out, stmt, level + 1);
            out.push('\n');
        }
        self.push_indent(out, level);
        out.push('}');
    }

    fn write_function(&self, out: &mut String, function: &Function, level: usize) {
        out.push('(');
        for (index, param) in function.params.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_param(out, param, level);
        }
        out.push_str(") => ");
        self.write_block(out, &function.body, level);
    }

    fn write_param(&self, out: &mut String, param: &Param, level: usize) {
        out.push_str(&param.name);
        if let Some(default) = &param.default {
            out.push_str(" = ");
            self.write_expr(out, default, level);
        }
    }

    fn write_expr(&self, out: &mut String, expr: &Expr, level: usize) {
        match expr {
            Expr::Ident(name) => out.push_str(name),
            Expr::Str(value) => out.push_str(&string_literal(value)),
            Expr::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
            Expr::Template(elements) => {
                out.push('`');
                for element in elements {
                    match element {
                        TemplateElement::Text(text) => out.push_str(&escape_template_literal(text)),
                        TemplateElement::Interpolation(expr) => {
                            out.push_str("${");
                            self.write_expr(out, expr, level);
                            out.push('}');
                        }
                    }
                }
                out.push('`');
            }
            Expr::Member {
                object,
                property,
                optional,
            } => {
                self.write_operand(out, object, level);
                match (property, optional) {
                    (PropertyKey::Ident(name), false) => {
                        let _ = write!(out, ".{name}");
                    }
                    (PropertyKey::Ident(name), true) => {
                        let _ = write!(out, "?.{name}");
                    }
                    (PropertyKey::Quoted(name), false) => {
                        let _ = write!(out, "[{}]", string_literal(name));
                    }
                    (PropertyKey::Quoted(name), true) => {
                        let _ = write!(out, "?.[{}]", string_literal(name));
                    }
                }
            }
            Expr::Call { callee, args } => {
                self.write_operand(out, callee, level);
                out.push('(');
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_expr(out, arg, level);
                }
                out.push(')');
            }
            Expr::Object(properties) => self.write_object(out, properties, level),
            Expr::Array(items) => {
                out.push('[');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_expr(out, item, level);
                }
                out.push(']');
            }
            Expr::Binary { op, left, right } => self.write_binary(out, *op, left, right, level),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.write_wrapped_if(out, test, level, |expr| {
                    matches!(expr, Expr::Conditional { .. } | Expr::Arrow(_))
                });
                out.push_str(" ? ");
                self.write_expr(out, consequent, level);
                out.push_str(" : ");
                self.write_expr(out, alternate, level);
            }
            Expr::Typeof(expr) => {
                out.push_str("typeof ");
                self.write_operand(out, expr, level);
            }
            Expr::Arrow(function) => self.write_function(out, function, level),
            Expr::Cast { ty, expr } => {
                let _ = write!(out, "/** @type {{{}}} */ (", comment_safe(ty));
                self.write_expr(out, expr, level);
                out.push(')');
            }
            Expr::Pure(expr) => {
                out.push_str("/* @__PURE__ */ ");
                self.write_expr(out, expr, level);
            }
        }
    }

    /// Objects holding functions are spread over several lines
    fn write_object(&self, out: &mut String, properties: &[Property], level: usize) {
        if properties.is_empty() {
            out.push_str("{}");
            return;
        }
        let multiline = properties
            .iter()
            .any(|property| contains_function(&property.value));
        if multiline {
            out.push_str("{\n");
            for (index, property) in properties.iter().enumerate() {
                if index > 0 {
                    out.push_str(",\n");
                }
                self.push_indent(out, level + 1);
                write_key(out, &property.key);
                out.push_str(": ");
                self.write_expr(out, &property.value, level + 1);
            }
            out.push('\n');
            self.push_indent(out, level);
            out.push('}');
            return;
        }
        out.push_str("{ ");
        for (index, property) in properties.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            write_key(out, &property.key);
            out.push_str(": ");
            self.write_expr(out, &property.value, level);
        }
        out.push_str(" }");
    }

    fn write_binary(&self, out: &mut String, op: BinaryOp, left: &Expr, right: &Expr, level: usize) {
        self.write_wrapped_if(out, left, level, |child| needs_parens(op, child, false));
        let _ = write!(out, " {} ", op.as_str());
        self.write_wrapped_if(out, right, level, |child| needs_parens(op, child, true));
    }

    /// Member objects, callees and `typeof` operands
    fn write_operand(&self, out: &mut String, expr: &Expr, level: usize) {
        self.write_wrapped_if(out, expr, level, |expr| {
            matches!(
                expr,
                Expr::Binary { .. }
                    | Expr::Conditional { .. }
                    | Expr::Arrow(_)
                    | Expr::Typeof(_)
                    | Expr::Pure(_)
            )
        });
    }

    fn write_wrapped_if(
        &self,
        out: &mut String,
        expr: &Expr,
        level: usize,
        wrap: impl Fn(&Expr) -> bool,
    ) {
        if wrap(expr) {
            out.push('(');
            self.write_expr(out, expr, level);
            out.push(')');
        } else {
            self.write_expr(out, expr, level);
        }
    }
}

fn write_key(out: &mut String, key: &PropertyKey) {
    match key {
        PropertyKey::Ident(name) => out.push_str(name),
        PropertyKey::Quoted(name) => out.push_str(&string_literal(name)),
    }
}

fn write_doc(out: &mut String, doc: &Doc) {
    out.push_str("/**\n");
    for line in &doc.lines {
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            let _ = writeln!(out, " * {}", comment_safe(line));
        }
    }
    out.push_str(" */\n");
}

fn contains_function(expr: &Expr) -> bool {
    match expr {
        Expr::Arrow(_) => true,
        Expr::Cast { expr, .. } | Expr::Pure(expr) => contains_function(expr),
        _ => false,
    }
}

fn needs_parens(parent: BinaryOp, child: &Expr, is_right: bool) -> bool {
    match child {
        Expr::Binary { op, .. } => {
            let mixes_nullish = (parent == BinaryOp::Nullish) != (*op == BinaryOp::Nullish)
                && matches!(parent, BinaryOp::Nullish | BinaryOp::And)
                && matches!(op, BinaryOp::Nullish | BinaryOp::And);
            if mixes_nullish {
                return true;
            }
            let (parent_prec, child_prec) = (parent.precedence(), op.precedence());
            if is_right {
                child_prec < parent_prec
                    || (child_prec == parent_prec
                        && !(*op == parent && matches!(op, BinaryOp::And | BinaryOp::Nullish)))
            } else {
                child_prec < parent_prec
            }
        }
        Expr::Conditional { .. } | Expr::Arrow(_) => true,
        _ => false,
    }
}
