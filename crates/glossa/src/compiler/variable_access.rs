//! Variable resolution
//!
//! Inputs are read from the message function's argument object with a
//! null-safe access, locals are plain `const` bindings inside the function.

use crate::{
    compiler::error::CompileError,
    js::{Expr, builder},
    model::{Argument, Declaration},
    safe_id::is_valid_identifier,
    types::FxIndexMap,
};

/// Parameter name of every per-locale message function
pub const INPUTS_PARAM: &str = "i";

/// Namespace import of the formatting functions
pub const REGISTRY: &str = "registry";

/// Names a local variable may not take because generated code binds them
const GENERATED_BINDINGS: &[&str] = &[INPUTS_PARAM, REGISTRY];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Input,
    Local,
}

/// The variables visible at one point of a message function
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: FxIndexMap<String, Binding>,
}

impl Scope {
    /// Only the inputs, the scope local definitions start from
    pub fn inputs(declarations: &[Declaration]) -> Self {
        let mut scope = Self::default();
        for declaration in declarations.iter().filter(|d| d.is_input()) {
            scope
                .bindings
                .entry(declaration.name().to_string())
                .or_insert(Binding::Input);
        }
        scope
    }

    /// Inputs plus every local, the scope patterns and selectors see
    pub fn full(declarations: &[Declaration]) -> Result<Self, CompileError> {
        let mut scope = Self::inputs(declarations);
        for declaration in declarations.iter().filter(|d| !d.is_input()) {
            scope.declare_local(declaration.name())?;
        }
        Ok(scope)
    }

    /// Make a local visible to everything compiled after it
    pub fn declare_local(&mut self, name: &str) -> Result<(), CompileError> {
        let reason = if !is_valid_identifier(name) {
            Some("is not a valid identifier")
        } else if GENERATED_BINDINGS.contains(&name) {
            Some("collides with a generated binding")
        } else if self.bindings.contains_key(name) {
            Some("is already declared")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(CompileError::InvalidLocalName {
                name: name.to_string(),
                reason,
            });
        }
        self.bindings.insert(name.to_string(), Binding::Local);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.bindings.get(name).copied()
    }

    pub fn has_inputs(&self) -> bool {
        self.bindings.values().any(|binding| *binding == Binding::Input)
    }

    /// Access expression for a declared variable
    pub fn resolve(&self, name: &str) -> Result<Expr, CompileError> {
        match self.lookup(name) {
            Some(Binding::Input) => Ok(input_access(name)),
            Some(Binding::Local) => Ok(builder::ident(name)),
            None => Err(CompileError::UnresolvedVariable {
                name: name.to_string(),
            }),
        }
    }

    /// Literals become string literals, references resolve
    pub fn argument(&self, argument: &Argument) -> Result<Expr, CompileError> {
        match argument {
            Argument::Literal { value } => Ok(builder::string(value)),
            Argument::VariableReference { name } => self.resolve(name),
        }
    }
}

/// `i?.name`, or `i?.["na me"]` when the name is not an identifier
pub fn input_access(name: &str) -> Expr {
    builder::optional_member(builder::ident(INPUTS_PARAM), name)
}
