//! Compiler configuration
//!
//! Settings are merged in layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. user config: `<config dir>/glossa/glossa.toml`
//! 3. project config: `glossa.toml` next to the project file
//! 4. an explicit `--config` file
//! 5. `GLOSSA_*` environment variables
//! 6. command line flags, applied by the binary
//!
//! Every file layer may omit any key; only keys present override.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use etcetera::BaseStrategy;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::ProjectSettings;

/// File name of project and user configuration
pub const CONFIG_FILE: &str = "glossa.toml";

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Directory the generated modules are written to
    pub out_dir: PathBuf,
    pub experimental_middleware_locale_splitting: bool,
    /// Report variants an earlier variant always beats
    pub warn_shadowed_variants: bool,
    /// Remove stale files from `out_dir` before writing
    pub clean_out_dir: bool,
    /// Overrides the project's base locale
    pub base_locale: Option<String>,
    /// Overrides the project's locale list
    pub locales: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("src/glossa"),
            experimental_middleware_locale_splitting: false,
            warn_shadowed_variants: true,
            clean_out_dir: false,
            base_locale: None,
            locales: None,
        }
    }
}

/// One configuration layer as written in a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigLayer {
    pub out_dir: Option<PathBuf>,
    pub experimental_middleware_locale_splitting: Option<bool>,
    pub warn_shadowed_variants: Option<bool>,
    pub clean_out_dir: Option<bool>,
    pub base_locale: Option<String>,
    pub locales: Option<Vec<String>>,
}

impl ConfigLayer {
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).context("Invalid glossa configuration")
    }

    pub fn read(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("In config file {}", path.display()))
    }

    /// Layer from `GLOSSA_*` variables, read through `lookup`
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let flag = |name: &str| -> Result<Option<bool>> {
            lookup(name)
                .map(|value| {
                    parse_flag(&value)
                        .with_context(|| format!("{name} must be a boolean, got `{value}`"))
                })
                .transpose()
        };
        Ok(Self {
            out_dir: lookup("GLOSSA_OUT_DIR").map(PathBuf::from),
            experimental_middleware_locale_splitting: flag(
                "GLOSSA_EXPERIMENTAL_MIDDLEWARE_LOCALE_SPLITTING",
            )?,
            warn_shadowed_variants: flag("GLOSSA_WARN_SHADOWED_VARIANTS")?,
            clean_out_dir: flag("GLOSSA_CLEAN_OUT_DIR")?,
            base_locale: lookup("GLOSSA_BASE_LOCALE"),
            locales: lookup("GLOSSA_LOCALES").map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|locale| !locale.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load every file and environment layer for a project directory
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = user_config_path().filter(|path| path.is_file()) {
            debug!("Loading user config from {}", path.display());
            config.apply(ConfigLayer::read(&path)?);
        }
        let project_config = project_dir.join(CONFIG_FILE);
        if project_config.is_file() {
            debug!("Loading project config from {}", project_config.display());
            config.apply(ConfigLayer::read(&project_config)?);
        }
        if let Some(path) = explicit {
            debug!("Loading config from {}", path.display());
            config.apply(ConfigLayer::read(path)?);
        }
        config.apply(ConfigLayer::from_env(|name| std::env::var(name).ok())?);

        Ok(config)
    }

    /// Override every key the layer sets
    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(out_dir) = layer.out_dir {
            self.out_dir = out_dir;
        }
        if let Some(enabled) = layer.experimental_middleware_locale_splitting {
            self.experimental_middleware_locale_splitting = enabled;
        }
        if let Some(enabled) = layer.warn_shadowed_variants {
            self.warn_shadowed_variants = enabled;
        }
        if let Some(enabled) = layer.clean_out_dir {
            self.clean_out_dir = enabled;
        }
        if layer.base_locale.is_some() {
            self.base_locale = layer.base_locale;
        }
        if layer.locales.is_some() {
            self.locales = layer.locales;
        }
    }

    /// Apply locale overrides to the project's settings
    pub fn settings(&self, project: &ProjectSettings) -> ProjectSettings {
        ProjectSettings {
            base_locale: self
                .base_locale
                .clone()
                .unwrap_or_else(|| project.base_locale.clone()),
            locales: self
                .locales
                .clone()
                .unwrap_or_else(|| project.locales.clone()),
        }
    }
}

/// `<config dir>/glossa/glossa.toml`, if the platform has a config dir
pub fn user_config_path() -> Option<PathBuf> {
    etcetera::choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir().join("glossa").join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.warn_shadowed_variants);
        assert!(!config.experimental_middleware_locale_splitting);
        assert_eq!(config.out_dir, PathBuf::from("src/glossa"));
    }

    #[test]
    fn test_layers_override_only_present_keys() {
        let mut config = Config::default();
        config.apply(
            ConfigLayer::parse("out-dir = \"dist/messages\"\nwarn-shadowed-variants = false\n")
                .expect("valid layer"),
        );
        config.apply(
            ConfigLayer::parse("experimental-middleware-locale-splitting = true\n")
                .expect("valid layer"),
        );
        assert_eq!(config.out_dir, PathBuf::from("dist/messages"));
        assert!(!config.warn_shadowed_variants);
        assert!(config.experimental_middleware_locale_splitting);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(ConfigLayer::parse("outdir = \"x\"\n").is_err());
    }

    #[test]
    fn test_env_layer() {
        let layer = ConfigLayer::from_env(|name| match name {
            "GLOSSA_LOCALES" => Some("en, de ,fr".to_string()),
            "GLOSSA_CLEAN_OUT_DIR" => Some("yes".to_string()),
            _ => None,
        })
        .expect("valid environment");
        assert_eq!(
            layer.locales,
            Some(vec!["en".to_string(), "de".to_string(), "fr".to_string()])
        );
        assert_eq!(layer.clean_out_dir, Some(true));
        assert_eq!(layer.out_dir, None);

        let invalid = ConfigLayer::from_env(|name| {
            (name == "GLOSSA_CLEAN_OUT_DIR").then(|| "maybe".to_string())
        });
        assert!(invalid.is_err());
    }

    #[test]
    fn test_locale_overrides() {
        let config = Config {
            locales: Some(vec!["en".to_string(), "fr".to_string()]),
            ..Config::default()
        };
        let settings = config.settings(&ProjectSettings::new("en", &["en", "de"]));
        assert_eq!(settings, ProjectSettings::new("en", &["en", "fr"]));
    }

    #[test]
    fn test_project_config_file_is_loaded() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE), "clean-out-dir = true\n").expect("write config");
        let config = Config::load(dir.path(), None).expect("config loads");
        assert!(config.clean_out_dir);
    }
}
