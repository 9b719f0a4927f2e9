//! Compile errors

use thiserror::Error;

use crate::parts::MarkupNestingError;

/// A structural problem that aborts compiling a bundle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("duplicate locale `{locale}`")]
    DuplicateLocale { locale: String },

    #[error("message has no variants")]
    EmptyMessage,

    #[error("variable `{name}` is not declared")]
    UnresolvedVariable { name: String },

    #[error("local variable `{name}` {reason}")]
    InvalidLocalName { name: String, reason: &'static str },

    #[error(transparent)]
    Markup(#[from] MarkupNestingError),

    /// Location context added as the error leaves a bundle
    #[error("bundle `{bundle_id}`{}: {source}", location(.locale.as_deref(), .variant.as_deref()))]
    InBundle {
        bundle_id: String,
        locale: Option<String>,
        variant: Option<String>,
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Attach the bundle and, when known, the locale and variant
    ///
    /// Errors that already carry a location are returned unchanged.
    pub fn in_bundle(self, bundle_id: &str, locale: Option<&str>, variant: Option<String>) -> Self {
        if matches!(self, Self::InBundle { .. }) {
            return self;
        }
        Self::InBundle {
            bundle_id: bundle_id.to_string(),
            locale: locale.map(str::to_string),
            variant,
            source: Box::new(self),
        }
    }

    /// The innermost error, without location context
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::InBundle { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn location(locale: Option<&str>, variant: Option<&str>) -> String {
    match (locale, variant) {
        (Some(locale), Some(variant)) => format!(" (locale `{locale}`, variant {variant})"),
        (Some(locale), None) => format!(" (locale `{locale}`)"),
        (None, Some(variant)) => format!(" (variant {variant})"),
        (None, None) => String::new(),
    }
}
