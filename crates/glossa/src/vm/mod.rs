//! Reference evaluator for generated modules
//!
//! Interprets the [`crate::js`] tree directly, so generated dispatchers and
//! messages can be exercised without a JavaScript engine. `runtime.js` and
//! `registry.js` are provided by a [`Host`]; every other import resolves
//! against the generated modules.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use log::{debug, trace};
use thiserror::Error;

use crate::{
    js::{Expr, Item, Module},
    output::Output,
    parts::MessagePart,
    types::{FxIndexMap, FxIndexSet},
};

pub mod host;
pub mod interpreter;
pub mod value;

pub use host::{EmptyRegistry, Host, Registry};
pub use value::Value;

use interpreter::Env;

/// Module path of the runtime, relative to the output root
const RUNTIME_MODULE: &str = "runtime.js";

/// Module path of the formatting functions, relative to the output root
const REGISTRY_MODULE: &str = "registry.js";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("`{name}` is not defined")]
    UndefinedBinding { name: String },

    #[error("cannot read property `{property}` of {target}")]
    PropertyOfNullish { property: String, target: String },

    #[error("{value} is not a function")]
    NotCallable { value: String },

    #[error("module `{path}` not found")]
    ModuleNotFound { path: String },

    #[error("module `{path}` has no export `{name}`")]
    MissingExport { path: String, name: String },

    #[error("unknown formatting function `{name}`")]
    UnknownFunction { name: String },

    #[error("circular import of `{path}`")]
    CircularImport { path: String },

    #[error("invalid parts record: {reason}")]
    InvalidPart { reason: String },
}

/// Evaluates generated modules against a [`Host`]
#[derive(Debug)]
pub struct Vm {
    modules: BTreeMap<String, Module>,
    host: Host,
    globals: Rc<Env>,
    loaded: RefCell<FxIndexMap<String, Value>>,
    loading: RefCell<FxIndexSet<String>>,
}

impl Vm {
    /// An evaluator without generated modules, for standalone expressions
    pub fn new(host: Host) -> Self {
        Self::with_modules(BTreeMap::new(), host)
    }

    pub fn with_output(output: &Output, host: Host) -> Self {
        Self::with_modules(output.modules.clone(), host)
    }

    pub fn with_modules(modules: BTreeMap<String, Module>, host: Host) -> Self {
        let globals = Env::root();
        globals.declare(
            "String",
            Value::native("String", |args| {
                Ok(Value::String(
                    args.first()
                        .map_or_else(String::new, Value::to_js_string),
                ))
            }),
        );
        globals.declare(
            "Object",
            Value::object([("assign".to_string(), Value::native("assign", object_assign))]),
        );
        globals.declare("globalThis", host.global_this());

        Self {
            modules,
            host,
            globals,
            loaded: RefCell::default(),
            loading: RefCell::default(),
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Evaluate a module and return its namespace object
    pub fn load(&self, path: &str) -> Result<Value, EvalError> {
        if let Some(namespace) = self.loaded.borrow().get(path) {
            return Ok(namespace.clone());
        }
        let namespace = match path {
            RUNTIME_MODULE => self.host.runtime_module(),
            REGISTRY_MODULE => self.host.registry_module(),
            _ => self.evaluate_module(path)?,
        };
        self.loaded
            .borrow_mut()
            .insert(path.to_string(), namespace.clone());
        Ok(namespace)
    }

    /// A named export of a module
    pub fn export(&self, path: &str, name: &str) -> Result<Value, EvalError> {
        match self.load(path)? {
            Value::Object(exports) => {
                exports
                    .borrow()
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EvalError::MissingExport {
                        path: path.to_string(),
                        name: name.to_string(),
                    })
            }
            namespace => namespace.get(name),
        }
    }

    /// Evaluate a standalone expression with `registry` in scope
    pub fn evaluate(&self, expr: &Expr) -> Result<Value, EvalError> {
        let env = Env::child(&self.globals);
        env.declare(
            crate::compiler::variable_access::REGISTRY,
            self.host.registry_module(),
        );
        interpreter::eval_expr(expr, &env)
    }

    /// Call a message function with JSON inputs and an optional locale option
    pub fn call(
        &self,
        function: &Value,
        inputs: &serde_json::Value,
        locale: Option<&str>,
    ) -> Result<Value, EvalError> {
        let mut args = vec![Value::from_json(inputs)];
        if let Some(locale) = locale {
            args.push(Value::object([("locale".to_string(), Value::string(locale))]));
        }
        interpreter::call(function, &args)
    }

    /// Call a message function for its string
    pub fn call_string(
        &self,
        function: &Value,
        inputs: &serde_json::Value,
        locale: Option<&str>,
    ) -> Result<String, EvalError> {
        self.call(function, inputs, locale)
            .map(|value| value.to_js_string())
    }

    /// Call a message function's `.parts` capability
    pub fn call_parts(
        &self,
        function: &Value,
        inputs: &serde_json::Value,
        locale: Option<&str>,
    ) -> Result<Vec<MessagePart>, EvalError> {
        let parts = self.call(&function.get("parts")?, inputs, locale)?;
        serde_json::from_value(parts.to_json()).map_err(|error| EvalError::InvalidPart {
            reason: error.to_string(),
        })
    }

    fn evaluate_module(&self, path: &str) -> Result<Value, EvalError> {
        let module = self
            .modules
            .get(path)
            .ok_or_else(|| EvalError::ModuleNotFound {
                path: path.to_string(),
            })?;
        if !self.loading.borrow_mut().insert(path.to_string()) {
            return Err(EvalError::CircularImport {
                path: path.to_string(),
            });
        }
        debug!("Evaluating module {path}");

        let env = Env::child(&self.globals);
        let mut exports: Vec<(String, Value)> = Vec::new();
        for item in &module.items {
            self.evaluate_item(path, item, &env, &mut exports)?;
        }

        self.loading.borrow_mut().shift_remove(path);
        Ok(Value::object(exports))
    }

    fn evaluate_item(
        &self,
        path: &str,
        item: &Item,
        env: &Rc<Env>,
        exports: &mut Vec<(String, Value)>,
    ) -> Result<(), EvalError> {
        match item {
            Item::Import { names, source } => {
                let namespace = self.load(&resolve(path, source))?;
                for name in names {
                    env.declare(name, namespace.get(name)?);
                }
            }
            Item::ImportNamespace { alias, source } => {
                env.declare(alias, self.load(&resolve(path, source))?);
            }
            Item::Typedef { .. } => {}
            Item::Const {
                export, name, init, ..
            } => {
                let value = interpreter::eval_expr(init, env)?;
                env.declare(name, value.clone());
                if *export {
                    exports.push((name.clone(), value));
                }
            }
            Item::ExportAlias { local, exported } => {
                let value = env.lookup(local).ok_or_else(|| EvalError::UndefinedBinding {
                    name: local.clone(),
                })?;
                exports.push((exported.clone(), value));
            }
            Item::ReExport { names, source } => {
                let target = resolve(path, source);
                for name in names {
                    exports.push((name.clone(), self.export(&target, name)?));
                }
            }
            Item::ReExportAll { alias, source } => {
                let namespace = self.load(&resolve(path, source))?;
                match alias {
                    Some(alias) => exports.push((alias.clone(), namespace)),
                    None => {
                        if let Value::Object(props) = &namespace {
                            exports.extend(
                                props
                                    .borrow()
                                    .iter()
                                    .map(|(name, value)| (name.clone(), value.clone())),
                            );
                        }
                    }
                }
            }
        }
        trace!("{path}: evaluated {}", item_kind(item));
        Ok(())
    }
}

fn item_kind(item: &Item) -> &'static str {
    match item {
        Item::Import { .. } | Item::ImportNamespace { .. } => "import",
        Item::Typedef { .. } => "typedef",
        Item::Const { .. } => "const",
        Item::ExportAlias { .. } | Item::ReExport { .. } | Item::ReExportAll { .. } => "export",
    }
}

/// `Object.assign(target, ...sources)`
fn object_assign(args: &[Value]) -> Result<Value, EvalError> {
    let Some(target) = args.first() else {
        return Err(EvalError::PropertyOfNullish {
            property: "assign".to_string(),
            target: "undefined".to_string(),
        });
    };
    for source in &args[1..] {
        let Value::Object(source) = source else {
            continue;
        };
        let entries = source.borrow().clone();
        match target {
            Value::Object(props) => props.borrow_mut().extend(entries),
            Value::Function(callable) => callable.props.borrow_mut().extend(entries),
            _ => {}
        }
    }
    Ok(target.clone())
}

/// Resolve an import specifier against the importing module's path
fn resolve(from: &str, specifier: &str) -> String {
    let mut segments: Vec<&str> = from.split('/').collect();
    segments.pop();
    for segment in specifier.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}
