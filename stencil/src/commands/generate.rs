use std::path::{Path, PathBuf};

use clap::Args;
use eyre::Result;
use stencil_codegen::{DEFAULT_MAX_TEMPLATE_DEPTH, GenerateStats};
use stencil_core::MemorySink;
use stencil_manifest::StencilToml;

use super::UnwrapOrExit;
use crate::ops::{
    self,
    generate::{GenerateOptions, GenerateReport},
};

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to stencil.toml (defaults to ./stencil.toml)
    #[arg(short, long, default_value = "stencil.toml")]
    pub config: PathBuf,

    /// Output directory (overrides [project].output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory template sources are read from (defaults to the manifest directory)
    #[arg(long, env = "STENCIL_DIR")]
    pub working_dir: Option<PathBuf>,

    /// Maximum dependency depth followed when collecting templates
    #[arg(long, default_value_t = DEFAULT_MAX_TEMPLATE_DEPTH)]
    pub max_depth: usize,

    /// Preview generated files without writing to disk
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub async fn run(&self) -> Result<()> {
        let stencil_toml = StencilToml::open(&self.config).unwrap_or_exit();
        let manifest = stencil_toml.manifest();

        let working_dir = self
            .working_dir
            .clone()
            .unwrap_or_else(|| stencil_toml.dir().to_path_buf());
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| manifest.output_dir(stencil_toml.dir()));

        tracing::info!(
            manifest = %stencil_toml.path().display(),
            output = %output.display(),
            working_dir = %working_dir.display(),
            "generating"
        );

        let report = ops::generate(
            manifest,
            GenerateOptions {
                output_dir: &output,
                working_dir: &working_dir,
                max_depth: self.max_depth,
                dry_run: self.dry_run,
            },
        )
        .await?;

        match report {
            GenerateReport::Preview(sink) => Self::print_preview(&sink, &output),
            GenerateReport::Written(stats) => {
                Self::print_summary(&manifest.project.name, &stats, &output)
            }
        }
        Ok(())
    }

    fn print_preview(sink: &MemorySink, output: &Path) {
        for (path, content) in sink.files() {
            let relative = path.strip_prefix(output).unwrap_or(&path);
            println!("── {} ──", relative.display());
            println!("{}", content);
            println!();
        }
        println!("Dry run: {} file(s) not written", sink.len());
    }

    fn print_summary(name: &str, stats: &GenerateStats, output: &Path) {
        println!(
            "{}: {} template{} ({} generated, {} cached)",
            name,
            stats.templates,
            if stats.templates == 1 { "" } else { "s" },
            stats.generated,
            stats.cache_hits
        );

        if stats.written.is_empty() {
            println!("Nothing to write");
            return;
        }

        println!();
        println!("Written to {}:", output.display());
        for path in &stats.written {
            let relative = path.strip_prefix(output).unwrap_or(path);
            println!("  {}", relative.display());
        }
    }
}
