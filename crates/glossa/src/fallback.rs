//! Locale fallback chains
//!
//! A locale without a message borrows one from its fallback: the nearest
//! configured ancestor tag (`de-CH` falls back to `de`), otherwise the base
//! locale. The base locale has no fallback.

use log::trace;

use crate::{model::ProjectSettings, types::FxIndexMap};

/// Fallback per settings locale, in settings order
pub type FallbackMap = FxIndexMap<String, Option<String>>;

/// Derive the fallback of every configured locale
pub fn fallback_map(settings: &ProjectSettings) -> FallbackMap {
    let mut map = FallbackMap::default();
    for locale in &settings.locales {
        let fallback = if *locale == settings.base_locale {
            None
        } else {
            nearest_ancestor(locale, &settings.locales)
                .or_else(|| Some(settings.base_locale.clone()))
        };
        trace!("Fallback for {locale}: {fallback:?}");
        map.insert(locale.clone(), fallback);
    }
    map
}

/// Strip subtags from the end until a configured locale remains
fn nearest_ancestor(locale: &str, locales: &[String]) -> Option<String> {
    let mut candidate = locale;
    while let Some((parent, _)) = candidate.rsplit_once('-') {
        if locales.iter().any(|configured| configured == parent) {
            return Some(parent.to_string());
        }
        candidate = parent;
    }
    None
}
