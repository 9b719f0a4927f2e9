//! Project files
//!
//! A project is one JSON document holding the locale settings and every
//! bundle, as produced by a loader that parsed the translation sources.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    model::{Bundle, ProjectSettings},
    safe_id::locale_namespace,
    types::FxIndexSet,
};

/// A BCP 47 style tag: a letter, then ASCII letters, digits and `-`
///
/// Locales name module files, so anything else could escape or overwrite
/// the output layout.
pub fn is_valid_locale(locale: &str) -> bool {
    locale.starts_with(|c: char| c.is_ascii_alphabetic())
        && locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub settings: ProjectSettings,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
}

impl Project {
    pub fn from_json(source: &str) -> Result<Self> {
        let mut project: Self = serde_json::from_str(source).context("Invalid project file")?;
        project.normalize();
        Ok(project)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {}", path.display()))?;
        let project = Self::from_json(&source)
            .with_context(|| format!("In project file {}", path.display()))?;
        debug!(
            "Loaded {} bundle(s) for {} locale(s) from {}",
            project.bundles.len(),
            project.settings.locales.len(),
            path.display()
        );
        Ok(project)
    }

    /// Fill in message ids and bundle references the loader left out
    fn normalize(&mut self) {
        for bundle in &mut self.bundles {
            for message in &mut bundle.messages {
                if message.bundle_id.is_empty() {
                    message.bundle_id.clone_from(&bundle.id);
                }
                if message.id.is_empty() {
                    message.id = format!("{}_{}", bundle.id, message.locale);
                }
            }
        }
    }

    /// Reject projects that cannot compile to a consistent output tree
    pub fn validate(settings: &ProjectSettings, bundles: &[Bundle]) -> Result<()> {
        if settings.locales.is_empty() {
            bail!("No locales configured");
        }
        if !settings.locales.contains(&settings.base_locale) {
            bail!(
                "Base locale `{}` is not one of the configured locales ({})",
                settings.base_locale,
                settings.locales.join(", ")
            );
        }
        let mut locales = FxIndexSet::default();
        let mut namespaces = FxIndexSet::default();
        for locale in &settings.locales {
            if !is_valid_locale(locale) {
                bail!(
                    "Locale `{locale}` is not a language tag (letters, digits and `-`, starting with a letter)"
                );
            }
            if !locales.insert(locale.as_str()) {
                bail!("Locale `{locale}` is configured twice");
            }
            if !namespaces.insert(locale_namespace(locale)) {
                bail!("Locale `{locale}` differs from another configured locale only in case");
            }
        }

        let mut ids = FxIndexSet::default();
        for bundle in bundles {
            if !ids.insert(bundle.id.as_str()) {
                bail!("Bundle `{}` is defined twice", bundle.id);
            }
            for message in &bundle.messages {
                if !locales.contains(message.locale.as_str()) {
                    warn!(
                        "Bundle `{}` has a message for `{}`, which is not a configured locale",
                        bundle.id, message.locale
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"{
        "settings": { "baseLocale": "en", "locales": ["en", "de"] },
        "bundles": [
            {
                "id": "greeting",
                "declarations": [{ "type": "input-variable", "name": "name" }],
                "messages": [
                    {
                        "locale": "en",
                        "variants": [
                            {
                                "pattern": [
                                    { "type": "text", "value": "Hello " },
                                    { "type": "expression", "arg": { "type": "variable-reference", "name": "name" } }
                                ]
                            }
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_messages_are_normalized() {
        let project = Project::from_json(PROJECT).expect("project parses");
        let message = &project.bundles[0].messages[0];
        assert_eq!(message.bundle_id, "greeting");
        assert_eq!(message.id, "greeting_en");
        Project::validate(&project.settings, &project.bundles).expect("project is valid");
    }

    #[test]
    fn test_base_locale_must_be_configured() {
        let settings = ProjectSettings::new("fr", &["en", "de"]);
        let error = Project::validate(&settings, &[]).expect_err("base locale missing");
        assert!(error.to_string().contains("`fr`"));
    }

    #[test]
    fn test_locales_must_be_language_tags() {
        for locale in ["_index", "../x", "en/US", "en_US", "", "419"] {
            let settings = ProjectSettings::new("en", &["en", locale]);
            let error = Project::validate(&settings, &[]).expect_err("locale is rejected");
            assert!(error.to_string().contains(&format!("`{locale}`")), "{error}");
        }
        Project::validate(&ProjectSettings::new("en", &["en", "de-CH", "zh-Hant-TW"]), &[])
            .expect("tags are accepted");
    }

    #[test]
    fn test_locales_differing_in_case_are_rejected() {
        let settings = ProjectSettings::new("en-US", &["en-US", "EN-us"]);
        let error = Project::validate(&settings, &[]).expect_err("namespaces collide");
        assert!(error.to_string().contains("`EN-us`"), "{error}");
    }

    #[test]
    fn test_duplicate_bundles_are_rejected() {
        let project = Project::from_json(PROJECT).expect("project parses");
        let bundles = vec![project.bundles[0].clone(), project.bundles[0].clone()];
        assert!(Project::validate(&project.settings, &bundles).is_err());
    }
}
