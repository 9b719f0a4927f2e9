//! glossa: compiles localized message bundles into JavaScript modules
//!
//! The pipeline reads [`model`] records, derives types with [`analyzers`],
//! compiles each bundle with [`compiler`] into [`js`] trees, and lays the
//! result out as ES modules with [`output`]. [`orchestrator`] drives a whole
//! project from disk; [`vm`] evaluates generated modules for testing.

pub mod analyzers;
pub mod compiler;
pub mod config;
pub mod fallback;
pub mod js;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod parts;
pub mod project;
pub mod safe_id;
pub mod types;
pub mod vm;
