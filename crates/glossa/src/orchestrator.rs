//! Compilation driver
//!
//! Runs a whole project through the pipeline: validation, fallback
//! derivation, the variant order lint, per-bundle compilation and output
//! assembly, then writes the modules below the output directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::{
    analyzers::VariantOrderAnalyzer,
    compiler::{BundleCompileArgs, CompiledBundle, compile_bundle},
    config::Config,
    fallback::fallback_map,
    model::{Bundle, ProjectSettings},
    output::{ENTRY_MODULE, Output, generate_output, message_reference},
    project::Project,
    types::FxIndexMap,
};

/// Directory of the generated message modules, relative to the output directory
const MESSAGES_DIR: &str = "messages";

/// Drives compilation with one effective configuration
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Config,
}

/// What a build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub bundles: usize,
    pub locales: usize,
    pub written: Vec<PathBuf>,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load a project file, compile it and write the output tree
    pub fn build(&self, project_path: &Path) -> Result<BuildSummary> {
        let project = Project::load(project_path)?;
        let settings = self.config.settings(&project.settings);
        let output = self.compile(&settings, &project.bundles)?;
        let written = self.write(&output)?;
        info!(
            "Wrote {} file(s) to {}",
            written.len(),
            self.config.out_dir.display()
        );
        Ok(BuildSummary {
            bundles: project.bundles.len(),
            locales: settings.locales.len(),
            written,
        })
    }

    /// Compile every bundle and assemble the modules
    pub fn compile(&self, settings: &ProjectSettings, bundles: &[Bundle]) -> Result<Output> {
        Project::validate(settings, bundles)?;
        let fallbacks = fallback_map(settings);
        let middleware = self.config.experimental_middleware_locale_splitting;

        let mut compiled_bundles = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            if self.config.warn_shadowed_variants {
                VariantOrderAnalyzer::warn_shadowed(bundle);
            }
            let compiled = compile_bundle(BundleCompileArgs {
                bundle,
                fallback_map: &fallbacks,
                message_reference,
                settings: Some(settings),
                middleware_locale_splitting: middleware,
            })?;
            compiled_bundles.push(compiled);
        }
        check_safe_id_collisions(&compiled_bundles)?;

        debug!(
            "Compiled {} bundle(s) for locales {}",
            compiled_bundles.len(),
            settings.locales.join(", ")
        );
        Ok(generate_output(
            &compiled_bundles,
            settings,
            &fallbacks,
            middleware,
        ))
    }

    /// Write the rendered modules, returning the paths written
    pub fn write(&self, output: &Output) -> Result<Vec<PathBuf>> {
        let out_dir = &self.config.out_dir;
        if self.config.clean_out_dir {
            clean_generated(out_dir)?;
        }

        let mut written = Vec::with_capacity(output.modules.len());
        for (relative, source) in output.render() {
            let path = out_dir.join(&relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            fs::write(&path, source)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Two ids sanitized to the same binding would overwrite each other's exports
fn check_safe_id_collisions(compiled_bundles: &[CompiledBundle]) -> Result<()> {
    let mut seen: FxIndexMap<&str, &str> = FxIndexMap::default();
    for compiled in compiled_bundles {
        if let Some(previous) = seen.insert(compiled.safe_id.as_str(), compiled.id()) {
            bail!(
                "Bundles `{previous}` and `{}` both compile to the binding `{}`",
                compiled.id(),
                compiled.safe_id
            );
        }
    }
    Ok(())
}

/// Remove previously generated modules; other files in the directory stay
fn clean_generated(out_dir: &Path) -> Result<()> {
    let messages = out_dir.join(MESSAGES_DIR);
    if messages.is_dir() {
        debug!("Removing {}", messages.display());
        fs::remove_dir_all(&messages)
            .with_context(|| format!("Failed to remove {}", messages.display()))?;
    }
    let entry = out_dir.join(ENTRY_MODULE);
    if entry.is_file() {
        fs::remove_file(&entry).with_context(|| format!("Failed to remove {}", entry.display()))?;
    }
    Ok(())
}
