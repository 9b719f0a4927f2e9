//! Pure reductions over bundles
//!
//! Each analyzer scans a bundle once and returns an immutable summary. The
//! compiler threads these summaries explicitly; nothing is accumulated in
//! shared state, so bundles can be analyzed independently.

pub mod input_types;
pub mod jsdoc;
pub mod markup_schema;
pub mod types;
pub mod variant_order;

pub use input_types::InputTypeAnalyzer;
pub use markup_schema::MarkupSchemaAnalyzer;
pub use variant_order::VariantOrderAnalyzer;
