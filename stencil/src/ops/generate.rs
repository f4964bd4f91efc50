//! Generate operation - one generation pass over a manifest.

use std::path::Path;

use eyre::{Context, Result};
use stencil_codegen::{CodeGenConfig, CodeGenerator, GenerateStats};
use stencil_core::MemorySink;
use stencil_manifest::Manifest;

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    /// Output directory for generated files.
    pub output_dir: &'a Path,
    /// Directory template sources are read from.
    pub working_dir: &'a Path,
    /// Maximum dependency depth followed when collecting templates.
    pub max_depth: usize,
    /// Whether to preview without writing files.
    pub dry_run: bool,
}

/// Outcome of a generation pass.
pub enum GenerateReport {
    /// Files rendered into memory only.
    Preview(MemorySink),
    /// Files written to disk.
    Written(GenerateStats),
}

/// Execute the generate operation.
pub async fn generate(manifest: &Manifest, opts: GenerateOptions<'_>) -> Result<GenerateReport> {
    let mut generator = CodeGenerator::new(opts.working_dir).with_max_depth(opts.max_depth);
    let mut config =
        CodeGenConfig::new(opts.output_dir, manifest.project()).templates(manifest.templates());

    if opts.dry_run {
        let sink = MemorySink::new();
        generator
            .generate_with_sink(&mut config, &sink)
            .await
            .wrap_err("Failed to generate code")?;
        return Ok(GenerateReport::Preview(sink));
    }

    let stats = generator
        .generate(&mut config)
        .await
        .wrap_err("Failed to generate code")?;
    Ok(GenerateReport::Written(stats))
}
