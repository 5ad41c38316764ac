//! Library interface for the objgen command line tool
//!
//! A run has two phases. Every configured documentation index is loaded
//! into one [`EntityStore`], then deferred methods are attached
//! ([`load_indexes`]). Only then is Go code generated from the completed
//! store ([`generate`]).

pub mod config;

use anyhow::{Context, Result};
use objgen_codegen::{Codegen, Diagnostics, GoCodegen, RunSummary};
use objgen_core::EntityStore;
use objgen_parser::{JsonDocIndex, LoadStats, Loader};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use config::{FileConfig, Overrides, Settings};

/// Result of one generation run
#[derive(Debug)]
pub struct Generated {
    pub code: String,
    pub load: LoadStats,
    pub summary: RunSummary,
    pub diagnostics: Diagnostics,
}

/// Machine-readable report printed by `objgen summary --json`
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub load: &'a LoadStats,
    pub summary: &'a RunSummary,
}

/// Load every index in order, then attach deferred methods.
pub fn load_indexes(indexes: &[PathBuf]) -> Result<(EntityStore, LoadStats)> {
    let mut store = EntityStore::new();
    let mut loader = Loader::new(&mut store);
    for dir in indexes {
        info!("loading documentation index {}", dir.display());
        let index = JsonDocIndex::open(dir)
            .with_context(|| format!("Failed to open documentation index: {}", dir.display()))?;
        loader
            .load_index(&index)
            .with_context(|| format!("Failed to load documentation index: {}", dir.display()))?;
    }
    let stats = loader.finish();

    let unresolved = store.unresolved();
    if !unresolved.is_empty() {
        warn!("{} referenced entities were never defined", unresolved.len());
        debug!("unresolved references: {:?}", unresolved);
    }
    Ok((store, stats))
}

/// Load the configured indexes and generate Go code.
pub fn generate(settings: &Settings) -> Result<Generated> {
    let (store, load) = load_indexes(&settings.indexes)?;
    let mut codegen = GoCodegen::new().with_config(settings.codegen.clone());
    let code = codegen
        .generate(&store)
        .context("Failed to generate Go code")?;
    Ok(Generated {
        code,
        load,
        summary: codegen.summary().clone(),
        diagnostics: codegen.diagnostics().clone(),
    })
}

/// Write generated code to `output`, or to stdout when unset.
pub fn write_output(code: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, code)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!("Generated Go code written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(code.as_bytes())
                .context("Failed to write to stdout")?;
            lock.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}

/// Summary table followed by the grouped diagnostics.
pub fn render_report(generated: &Generated) -> Result<String> {
    let mut out = generated
        .summary
        .render_table()
        .context("Failed to render summary")?;
    if !generated.diagnostics.is_empty() {
        out.push('\n');
        out.push_str(&generated.diagnostics.format_summary());
    }
    Ok(out)
}

pub fn render_json(generated: &Generated) -> Result<String> {
    let report = Report {
        load: &generated.load,
        summary: &generated.summary,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize summary")
}
