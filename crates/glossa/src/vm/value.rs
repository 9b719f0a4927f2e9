//! Runtime values of the evaluator
//!
//! Only the slice of JavaScript semantics the generated modules rely on:
//! string conversion, truthiness, `==`/`===` and property access.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    js::{Expr, Function, Generator},
    types::FxIndexMap,
    vm::{EvalError, host::Registry, interpreter::Env},
};

/// Properties of an object or function, in insertion order
pub type Properties = FxIndexMap<String, Value>;

/// Native function body
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, EvalError>>;

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(Rc<RefCell<Properties>>),
    Array(Rc<Vec<Value>>),
    Function(Rc<Callable>),
    /// The formatting function namespace; every property is a function
    Registry(Rc<dyn Registry>),
}

/// A function value and its own properties, such as `.parts`
pub struct Callable {
    pub kind: CallableKind,
    pub props: RefCell<Properties>,
}

pub enum CallableKind {
    Closure {
        function: Rc<Function>,
        env: Rc<Env>,
    },
    Native {
        name: String,
        body: NativeFn,
    },
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{}", number_to_string(*value)),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Object(props) => f.debug_map().entries(props.borrow().iter()).finish(),
            Self::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Function(callable) => write!(f, "{callable:?}"),
            Self::Registry(_) => write!(f, "[registry]"),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CallableKind::Closure { function, .. } => write!(
                f,
                "[Function ({} param(s)), props: {:?}]",
                function.params.len(),
                self.props.borrow().keys().collect::<Vec<_>>()
            ),
            CallableKind::Native { name, .. } => write!(f, "[Function {name}]"),
        }
    }
}

impl fmt::Debug for CallableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure { .. } => write!(f, "Closure"),
            Self::Native { name, .. } => write!(f, "Native({name})"),
        }
    }
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn object(props: impl IntoIterator<Item = (String, Self)>) -> Self {
        Self::Object(Rc::new(RefCell::new(props.into_iter().collect())))
    }

    pub fn native(
        name: &str,
        body: impl Fn(&[Self]) -> Result<Self, EvalError> + 'static,
    ) -> Self {
        Self::Function(Rc::new(Callable {
            kind: CallableKind::Native {
                name: name.to_string(),
                body: Rc::new(body),
            },
            props: RefCell::default(),
        }))
    }

    pub(crate) fn closure(function: Function, env: Rc<Env>) -> Self {
        Self::Function(Rc::new(Callable {
            kind: CallableKind::Closure {
                function: Rc::new(function),
                env,
            },
            props: RefCell::default(),
        }))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(value) => *value,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::String(value) => !value.is_empty(),
            Self::Object(_) | Self::Array(_) | Self::Function(_) | Self::Registry(_) => true,
        }
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Function(_) => "function",
            Self::Null | Self::Object(_) | Self::Array(_) | Self::Registry(_) => "object",
        }
    }

    /// `String(value)`
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => number_to_string(*value),
            Self::String(value) => value.clone(),
            Self::Object(_) | Self::Registry(_) => "[object Object]".to_string(),
            Self::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Function(callable) => match &callable.kind {
                CallableKind::Closure { function, .. } => {
                    Generator::default().expr(&Expr::Arrow(Box::new(function.as_ref().clone())))
                }
                CallableKind::Native { name, .. } => {
                    format!("function {name}() {{ [native code] }}")
                }
            },
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Self::Undefined => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(value) => f64::from(u8::from(*value)),
            Self::Number(value) => *value,
            Self::String(value) => string_to_number(value),
            _ => string_to_number(&self.to_js_string()),
        }
    }

    fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::Object(_) | Self::Array(_) | Self::Function(_) | Self::Registry(_)
        )
    }

    /// `===`
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Object(left), Self::Object(right)) => Rc::ptr_eq(left, right),
            (Self::Array(left), Self::Array(right)) => Rc::ptr_eq(left, right),
            (Self::Function(left), Self::Function(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// `==`, with the coercions of the abstract equality algorithm
    pub fn loose_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (left, right) if left.is_nullish() || right.is_nullish() => {
                left.is_nullish() && right.is_nullish()
            }
            (Self::Number(_), Self::String(_)) | (Self::String(_), Self::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Self::Bool(_), _) => Self::Number(self.to_number()).loose_equals(other),
            (_, Self::Bool(_)) => self.loose_equals(&Self::Number(other.to_number())),
            (left, right) if left.is_reference() && !right.is_reference() => {
                Self::String(left.to_js_string()).loose_equals(right)
            }
            (left, right) if !left.is_reference() && right.is_reference() => {
                left.loose_equals(&Self::String(right.to_js_string()))
            }
            _ => self.strict_equals(other),
        }
    }

    /// Property read; reading from `undefined` or `null` is an error
    pub fn get(&self, name: &str) -> Result<Self, EvalError> {
        let value = match self {
            Self::Undefined | Self::Null => {
                return Err(EvalError::PropertyOfNullish {
                    property: name.to_string(),
                    target: self.to_js_string(),
                });
            }
            Self::Object(props) => props.borrow().get(name).cloned(),
            Self::Function(callable) => callable.props.borrow().get(name).cloned(),
            Self::Array(items) => match name {
                "length" => Some(Self::Number(items.len() as f64)),
                index => index
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index).cloned()),
            },
            Self::String(value) if name == "length" => {
                Some(Self::Number(value.encode_utf16().count() as f64))
            }
            Self::Registry(registry) => Some(registry_function(registry, name)),
            _ => None,
        };
        Ok(value.unwrap_or(Self::Undefined))
    }

    /// Convert from JSON; numbers become doubles
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(*value),
            serde_json::Value::Number(number) => Self::Number(number.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(value) => Self::String(value.clone()),
            serde_json::Value::Array(items) => {
                Self::Array(Rc::new(items.iter().map(Self::from_json).collect()))
            }
            serde_json::Value::Object(map) => Self::object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value))),
            ),
        }
    }

    /// Convert to JSON the way `JSON.stringify` would: `undefined`
    /// properties are dropped, functions become `null`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null | Self::Function(_) | Self::Registry(_) => {
                serde_json::Value::Null
            }
            Self::Bool(value) => serde_json::Value::Bool(*value),
            Self::Number(value) => number_to_json(*value),
            Self::String(value) => serde_json::Value::String(value.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(props) => serde_json::Value::Object(
                props
                    .borrow()
                    .iter()
                    .filter(|(_, value)| !matches!(value, Self::Undefined | Self::Function(_)))
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

fn registry_function(registry: &Rc<dyn Registry>, name: &str) -> Value {
    let registry = Rc::clone(registry);
    let function = name.to_string();
    Value::native(name, move |args| {
        let locale = args.first().map(Value::to_js_string).unwrap_or_default();
        let value = args.get(1).cloned().unwrap_or(Value::Undefined);
        let options = match args.get(2) {
            Some(Value::Object(props)) => props.borrow().clone(),
            _ => Properties::default(),
        };
        registry.call(&function, &locale, &value, &options)
    })
}

fn number_to_json(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(value as i64);
    }
    serde_json::Number::from_f64(value).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// `Number.prototype.toString` for the values messages deal with
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e21 {
        return format!("{value:.0}");
    }
    format!("{value}")
}

/// `Number(string)`
fn string_to_number(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    let lowercase = trimmed.to_ascii_lowercase();
    if lowercase.contains("inf") || lowercase.contains("nan") {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(number_to_string(5.0), "5");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1.5), "1.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
    }

    #[test]
    fn test_loose_equality_coerces() {
        assert!(Value::Number(1.0).loose_equals(&Value::string("1")));
        assert!(Value::string("1").loose_equals(&Value::Number(1.0)));
        assert!(!Value::Number(5.0).loose_equals(&Value::string("1")));
        assert!(Value::Bool(true).loose_equals(&Value::string("1")));
        assert!(Value::Undefined.loose_equals(&Value::Null));
        assert!(!Value::Undefined.loose_equals(&Value::string("undefined")));
        assert!(!Value::string("1").strict_equals(&Value::Number(1.0)));
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(Value::Undefined.to_js_string(), "undefined");
        assert_eq!(
            Value::Array(Rc::new(vec![Value::Number(1.0), Value::Null, Value::string("a")]))
                .to_js_string(),
            "1,,a"
        );
        assert_eq!(Value::object([]).to_js_string(), "[object Object]");
    }

    #[test]
    fn test_property_access() {
        let object = Value::object([("to".to_string(), Value::string("/docs"))]);
        assert_eq!(object.get("to").expect("readable").to_js_string(), "/docs");
        assert!(matches!(object.get("missing"), Ok(Value::Undefined)));
        assert!(Value::Undefined.get("x").is_err());
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({ "count": 5, "name": "Ada", "tags": ["a"] });
        let value = Value::from_json(&json);
        assert_eq!(value.to_json(), json);
    }
}
