//! Tree-walking evaluation of expressions and statements

use std::{cell::RefCell, rc::Rc};

use log::trace;

use crate::{
    js::{BinaryOp, Expr, Function, Stmt, TemplateElement},
    types::FxIndexMap,
    vm::{
        EvalError,
        value::{CallableKind, Value},
    },
};

/// A lexical scope
#[derive(Debug, Default)]
pub struct Env {
    vars: RefCell<FxIndexMap<String, Value>>,
    parent: Option<Rc<Env>>,
}

impl Env {
    pub fn root() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn child(parent: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self {
            vars: RefCell::default(),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn declare(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_string(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }
}

pub fn eval_expr(expr: &Expr, env: &Rc<Env>) -> Result<Value, EvalError> {
    match expr {
        Expr::Ident(name) => env.lookup(name).ok_or_else(|| EvalError::UndefinedBinding {
            name: name.clone(),
        }),
        Expr::Str(value) => Ok(Value::string(value.as_str())),
        Expr::Bool(value) => Ok(Value::Bool(*value)),
        Expr::Template(elements) => {
            let mut text = String::new();
            for element in elements {
                match element {
                    TemplateElement::Text(raw) => text.push_str(raw),
                    TemplateElement::Interpolation(expr) => {
                        text.push_str(&eval_expr(expr, env)?.to_js_string());
                    }
                }
            }
            Ok(Value::String(text))
        }
        Expr::Member {
            object,
            property,
            optional,
        } => {
            let target = eval_expr(object, env)?;
            if *optional && target.is_nullish() {
                return Ok(Value::Undefined);
            }
            target.get(property.name())
        }
        Expr::Call { callee, args } => {
            let function = eval_expr(callee, env)?;
            let args = args
                .iter()
                .map(|arg| eval_expr(arg, env))
                .collect::<Result<Vec<_>, _>>()?;
            call(&function, &args)
        }
        Expr::Object(properties) => {
            let mut props = Vec::with_capacity(properties.len());
            for property in properties {
                props.push((
                    property.key.name().to_string(),
                    eval_expr(&property.value, env)?,
                ));
            }
            Ok(Value::object(props))
        }
        Expr::Array(items) => Ok(Value::Array(Rc::new(
            items
                .iter()
                .map(|item| eval_expr(item, env))
                .collect::<Result<_, _>>()?,
        ))),
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, env),
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if eval_expr(test, env)?.is_truthy() {
                eval_expr(consequent, env)
            } else {
                eval_expr(alternate, env)
            }
        }
        Expr::Typeof(operand) => {
            // `typeof` tolerates undeclared bindings
            if let Expr::Ident(name) = operand.as_ref()
                && env.lookup(name).is_none()
            {
                return Ok(Value::string("undefined"));
            }
            Ok(Value::string(eval_expr(operand, env)?.type_of()))
        }
        Expr::Arrow(function) => Ok(Value::closure(function.as_ref().clone(), Rc::clone(env))),
        Expr::Cast { expr, .. } | Expr::Pure(expr) => eval_expr(expr, env),
    }
}

fn eval_binary(op: BinaryOp, left: &Expr, right: &Expr, env: &Rc<Env>) -> Result<Value, EvalError> {
    let left = eval_expr(left, env)?;
    match op {
        BinaryOp::And if !left.is_truthy() => Ok(left),
        BinaryOp::Nullish if !left.is_nullish() => Ok(left),
        BinaryOp::And | BinaryOp::Nullish => eval_expr(right, env),
        BinaryOp::LooseEq => Ok(Value::Bool(left.loose_equals(&eval_expr(right, env)?))),
        BinaryOp::StrictEq => Ok(Value::Bool(left.strict_equals(&eval_expr(right, env)?))),
    }
}

/// Call a function value
pub fn call(function: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let Value::Function(callable) = function else {
        return Err(EvalError::NotCallable {
            value: format!("{function:?}"),
        });
    };
    match &callable.kind {
        CallableKind::Native { name, body } => {
            trace!("Calling native {name}");
            body(args)
        }
        CallableKind::Closure { function, env } => call_closure(function, env, args),
    }
}

fn call_closure(function: &Function, env: &Rc<Env>, args: &[Value]) -> Result<Value, EvalError> {
    let scope = Env::child(env);
    for (index, param) in function.params.iter().enumerate() {
        let mut value = args.get(index).cloned().unwrap_or(Value::Undefined);
        if matches!(value, Value::Undefined)
            && let Some(default) = &param.default
        {
            value = eval_expr(default, &scope)?;
        }
        scope.declare(&param.name, value);
    }
    Ok(exec_block(&function.body, &scope)?.unwrap_or(Value::Undefined))
}

/// Run statements; `Some` carries the value of a `return`
fn exec_block(stmts: &[Stmt], env: &Rc<Env>) -> Result<Option<Value>, EvalError> {
    for stmt in stmts {
        if let Some(value) = exec_stmt(stmt, env)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn exec_stmt(stmt: &Stmt, env: &Rc<Env>) -> Result<Option<Value>, EvalError> {
    match stmt {
        Stmt::Const { name, init } => {
            let value = eval_expr(init, env)?;
            env.declare(name, value);
            Ok(None)
        }
        Stmt::Return(expr) => eval_expr(expr, env).map(Some),
        Stmt::If { test, then } => {
            if eval_expr(test, env)?.is_truthy() {
                exec_stmt(then, env)
            } else {
                Ok(None)
            }
        }
        Stmt::Block(stmts) => exec_block(stmts, &Env::child(env)),
        Stmt::Expr(expr) => eval_expr(expr, env).map(|_| None),
    }
}
