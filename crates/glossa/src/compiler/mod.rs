//! The bundle, message and pattern compilers
//!
//! Compilation runs leaf-first: [`bundle`] compiles each locale's message
//! through [`message`], which compiles each variant's pattern through
//! [`pattern`] in string mode and, for markup, once more in parts mode.

pub mod bundle;
pub mod error;
pub mod local_variable;
pub mod message;
pub mod pattern;
pub mod variable_access;

pub use bundle::{BundleCompileArgs, CompiledBundle, MessageReference, compile_bundle};
pub use error::CompileError;
pub use message::{CompiledMessage, MessageFunction, compile_message};
pub use pattern::compile_pattern;
