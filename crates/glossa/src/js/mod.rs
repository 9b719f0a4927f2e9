//! A small JavaScript syntax tree for generated modules
//!
//! The compiler never concatenates source text directly. Every stage builds
//! these nodes (see [`builder`]) and the [`printer::Generator`] serializes them
//! as the final step, which keeps escaping in one place. The tree only covers
//! the constructs the compiler emits, and [`crate::vm`] can evaluate it.

pub mod builder;
pub mod printer;

pub use printer::Generator;

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A binding reference: `locale`
    Ident(String),
    /// A double-quoted string literal
    Str(String),
    Bool(bool),
    /// A template literal: `` `Hello ${i?.name}` ``
    Template(Vec<TemplateElement>),
    /// Property access: `a.b`, `a?.b`, `a?.["b c"]`
    Member {
        object: Box<Expr>,
        property: PropertyKey,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Object(Vec<Property>),
    Array(Vec<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Typeof(Box<Expr>),
    /// An arrow function with a block body
    Arrow(Box<Function>),
    /// A JSDoc type cast: `/** @type {T} */ (expr)`
    Cast { ty: String, expr: Box<Expr> },
    /// A call marked side-effect free for bundlers: `/* @__PURE__ */ expr`
    Pure(Box<Expr>),
}

/// How a property is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    /// Printed bare: `.name` / `name:`
    Ident(String),
    /// Printed quoted: `["na me"]` / `"na me":`
    Quoted(String),
}

impl PropertyKey {
    pub fn name(&self) -> &str {
        match self {
            Self::Ident(name) | Self::Quoted(name) => name,
        }
    }
}

/// A `key: value` entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
}

/// A piece of a template literal
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateElement {
    /// Raw text, escaped by the printer
    Text(String),
    /// `${expr}`
    Interpolation(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `==`
    LooseEq,
    /// `===`
    StrictEq,
    /// `&&`
    And,
    /// `??`
    Nullish,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LooseEq => "==",
            Self::StrictEq => "===",
            Self::And => "&&",
            Self::Nullish => "??",
        }
    }

    /// Binding strength, higher binds tighter
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Self::Nullish => 1,
            Self::And => 2,
            Self::LooseEq | Self::StrictEq => 3,
        }
    }
}

/// An arrow function
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// A function parameter with an optional default value
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

/// A statement inside a function body
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Const { name: String, init: Expr },
    Return(Expr),
    /// `if (test) <then>`; a [`Stmt::Block`] prints with braces
    If { test: Expr, then: Box<Stmt> },
    Block(Vec<Stmt>),
    Expr(Expr),
}

/// A JSDoc block attached to a declaration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Doc {
    pub lines: Vec<String>,
}

/// A top-level module item
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `import { a, b } from "source"`
    Import { names: Vec<String>, source: String },
    /// `import * as alias from "source"`
    ImportNamespace { alias: String, source: String },
    /// `/** @typedef {ty} name */`
    Typedef { ty: String, name: String },
    /// `[export] const name = init`
    Const {
        doc: Option<Doc>,
        no_side_effects: bool,
        export: bool,
        name: String,
        init: Expr,
    },
    /// `export { local as "exported" }`
    ExportAlias { local: String, exported: String },
    /// `export { a, b } from "source"`
    ReExport { names: Vec<String>, source: String },
    /// `export * as alias from "source"` or `export * from "source"`
    ReExportAll {
        alias: Option<String>,
        source: String,
    },
}

/// An ES module
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub items: Vec<Item>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Whether any expression in the module reads the given binding
    pub fn references(&self, binding: &str) -> bool {
        self.items.iter().any(|item| match item {
            Item::Const { init, .. } => expr_references(init, binding),
            _ => false,
        })
    }

    /// Whether any declaration or typedef mentions the given type name
    pub fn mentions_type(&self, type_name: &str) -> bool {
        self.items.iter().any(|item| match item {
            Item::Const { init, .. } => expr_mentions_type(init, type_name),
            Item::Typedef { ty, .. } => ty.contains(type_name),
            _ => false,
        })
    }
}

fn expr_references(expr: &Expr, binding: &str) -> bool {
    match expr {
        Expr::Ident(name) => name == binding,
        Expr::Str(_) | Expr::Bool(_) => false,
        Expr::Template(elements) => elements.iter().any(|element| match element {
            TemplateElement::Text(_) => false,
            TemplateElement::Interpolation(expr) => expr_references(expr, binding),
        }),
        Expr::Member { object, .. } => expr_references(object, binding),
        Expr::Call { callee, args } => {
            expr_references(callee, binding) || args.iter().any(|arg| expr_references(arg, binding))
        }
        Expr::Object(properties) => properties
            .iter()
            .any(|property| expr_references(&property.value, binding)),
        Expr::Array(items) => items.iter().any(|item| expr_references(item, binding)),
        Expr::Binary { left, right, .. } => {
            expr_references(left, binding) || expr_references(right, binding)
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            expr_references(test, binding)
                || expr_references(consequent, binding)
                || expr_references(alternate, binding)
        }
        Expr::Typeof(expr) | Expr::Cast { expr, .. } | Expr::Pure(expr) => {
            expr_references(expr, binding)
        }
        Expr::Arrow(function) => function_references(function, binding),
    }
}

fn function_references(function: &Function, binding: &str) -> bool {
    function
        .params
        .iter()
        .filter_map(|param| param.default.as_ref())
        .any(|default| expr_references(default, binding))
        || function
            .body
            .iter()
            .any(|stmt| stmt_references(stmt, binding))
}

fn stmt_references(stmt: &Stmt, binding: &str) -> bool {
    match stmt {
        Stmt::Const { init, .. } => expr_references(init, binding),
        Stmt::Return(expr) | Stmt::Expr(expr) => expr_references(expr, binding),
        Stmt::If { test, then } => expr_references(test, binding) || stmt_references(then, binding),
        Stmt::Block(stmts) => stmts.iter().any(|stmt| stmt_references(stmt, binding)),
    }
}

fn expr_mentions_type(expr: &Expr, type_name: &str) -> bool {
    match expr {
        Expr::Cast { ty, expr } => ty.contains(type_name) || expr_mentions_type(expr, type_name),
        Expr::Pure(expr) | Expr::Typeof(expr) => expr_mentions_type(expr, type_name),
        Expr::Call { callee, args } => {
            expr_mentions_type(callee, type_name)
                || args.iter().any(|arg| expr_mentions_type(arg, type_name))
        }
        Expr::Object(properties) => properties
            .iter()
            .any(|property| expr_mentions_type(&property.value, type_name)),
        Expr::Arrow(function) => function
            .body
            .iter()
            .any(|stmt| stmt_mentions_type(stmt, type_name)),
        _ => false,
    }
}

fn stmt_mentions_type(stmt: &Stmt, type_name: &str) -> bool {
    match stmt {
        Stmt::Const { init: expr, .. } | Stmt::Return(expr) | Stmt::Expr(expr) => {
            expr_mentions_type(expr, type_name)
        }
        Stmt::If { then, .. } => stmt_mentions_type(then, type_name),
        Stmt::Block(stmts) => stmts.iter().any(|stmt| stmt_mentions_type(stmt, type_name)),
    }
}
