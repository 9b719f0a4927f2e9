//! Shared type definitions for the glossa crate
//!
//! This module contains common types that are used across multiple components
//! of the compiler, ensuring consistency and avoiding circular dependencies.

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

/// Insertion-ordered map with the Fx hasher
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Insertion-ordered set with the Fx hasher
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// A compiled unit: the generated source text next to the record it came from
///
/// This is the output contract of every compiler stage. `code` is executable
/// JavaScript that is self-contained apart from the imports the output
/// assembler wires up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled<N> {
    /// The generated code
    pub code: String,
    /// The original input record
    pub node: N,
}

impl<N> Compiled<N> {
    pub fn new(code: String, node: N) -> Self {
        Self { code, node }
    }
}

/// How a pattern is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternMode {
    /// A single template literal; markup wrappers are dropped
    #[default]
    String,
    /// An array of part records that keeps the markup structure
    Parts,
}

impl std::fmt::Display for PatternMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Parts => write!(f, "parts"),
        }
    }
}
