//! The environment generated modules run against
//!
//! Stands in for `runtime.js` and `registry.js`, which applications provide.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    types::FxIndexMap,
    vm::{
        EvalError,
        value::{Properties, Value},
    },
};

/// Formatting functions reachable as `registry.<name>(locale, value, options)`
pub trait Registry {
    fn call(
        &self,
        function: &str,
        locale: &str,
        value: &Value,
        options: &Properties,
    ) -> Result<Value, EvalError>;
}

/// A registry without any functions
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyRegistry;

impl Registry for EmptyRegistry {
    fn call(
        &self,
        function: &str,
        _locale: &str,
        _value: &Value,
        _options: &Properties,
    ) -> Result<Value, EvalError> {
        Err(EvalError::UnknownFunction {
            name: function.to_string(),
        })
    }
}

/// Runtime state seen by the generated code
#[derive(Clone)]
pub struct Host {
    /// Returned by `getLocale()`
    pub locale: String,
    /// Value of `experimentalStaticLocale`
    pub static_locale: Option<String>,
    pub middleware_locale_splitting: bool,
    pub is_server: bool,
    /// `globalThis.__glossa_ssr`: message id to fixed text
    pub ssr_overrides: FxIndexMap<String, String>,
    pub registry: Rc<dyn Registry>,
    tracked: Rc<RefCell<Vec<(String, String)>>>,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("locale", &self.locale)
            .field("static_locale", &self.static_locale)
            .field("middleware_locale_splitting", &self.middleware_locale_splitting)
            .field("is_server", &self.is_server)
            .field("ssr_overrides", &self.ssr_overrides)
            .field("tracked", &self.tracked.borrow())
            .finish_non_exhaustive()
    }
}

impl Host {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            static_locale: None,
            middleware_locale_splitting: false,
            is_server: true,
            ssr_overrides: FxIndexMap::default(),
            registry: Rc::new(EmptyRegistry),
            tracked: Rc::default(),
        }
    }

    #[must_use]
    pub fn with_static_locale(mut self, locale: &str) -> Self {
        self.static_locale = Some(locale.to_string());
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: impl Registry + 'static) -> Self {
        self.registry = Rc::new(registry);
        self
    }

    /// Enable middleware splitting, running in the browser or on the server
    #[must_use]
    pub fn with_middleware(mut self, is_server: bool) -> Self {
        self.middleware_locale_splitting = true;
        self.is_server = is_server;
        self
    }

    #[must_use]
    pub fn with_ssr_override(mut self, id: &str, text: &str) -> Self {
        self.ssr_overrides.insert(id.to_string(), text.to_string());
        self
    }

    /// `(id, locale)` of every `trackMessageCall` so far
    pub fn tracked_calls(&self) -> Vec<(String, String)> {
        self.tracked.borrow().clone()
    }

    /// Namespace object of `runtime.js`
    pub(crate) fn runtime_module(&self) -> Value {
        let locale = self.locale.clone();
        let tracked = Rc::clone(&self.tracked);
        Value::object([
            (
                "getLocale".to_string(),
                Value::native("getLocale", move |_| Ok(Value::string(locale.as_str()))),
            ),
            (
                "experimentalStaticLocale".to_string(),
                self.static_locale
                    .as_deref()
                    .map_or(Value::Undefined, Value::string),
            ),
            (
                "trackMessageCall".to_string(),
                Value::native("trackMessageCall", move |args| {
                    let arg = |index: usize| {
                        args.get(index)
                            .map(Value::to_js_string)
                            .unwrap_or_default()
                    };
                    tracked.borrow_mut().push((arg(0), arg(1)));
                    Ok(Value::Undefined)
                }),
            ),
            (
                "experimentalMiddlewareLocaleSplitting".to_string(),
                Value::Bool(self.middleware_locale_splitting),
            ),
            ("isServer".to_string(), Value::Bool(self.is_server)),
        ])
    }

    /// Namespace object of `registry.js`
    pub(crate) fn registry_module(&self) -> Value {
        Value::Registry(Rc::clone(&self.registry))
    }

    /// `globalThis`, including the per-request overrides
    pub(crate) fn global_this(&self) -> Value {
        let overrides = self.ssr_overrides.iter().map(|(id, text)| {
            let text = text.clone();
            (
                id.clone(),
                Value::native(id, move |_| Ok(Value::string(text.as_str()))),
            )
        });
        Value::object([(
            crate::compiler::bundle::SSR_OVERRIDES.to_string(),
            Value::object(overrides),
        )])
    }
}
