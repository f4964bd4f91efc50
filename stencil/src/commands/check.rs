use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use stencil_codegen::{DEFAULT_MAX_TEMPLATE_DEPTH, collect_templates};
use stencil_manifest::StencilToml;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct CheckCommand {
    /// Path to stencil.toml (defaults to ./stencil.toml)
    #[arg(short, long, default_value = "stencil.toml")]
    pub config: PathBuf,

    /// Maximum dependency depth followed when collecting templates
    #[arg(long, default_value_t = DEFAULT_MAX_TEMPLATE_DEPTH)]
    pub max_depth: usize,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let stencil_toml = StencilToml::open(&self.config).unwrap_or_exit();
        let manifest = stencil_toml.manifest();

        println!("✓ {} is valid\n", self.config.display());
        println!("  {}", manifest.project.name);
        if !manifest.vars.is_empty() {
            println!("  vars: {}", manifest.vars.keys().cloned().collect::<Vec<_>>().join(", "));
        }
        println!();

        let templates = collect_templates(&manifest.templates(), self.max_depth);
        if templates.is_empty() {
            println!("  No templates defined");
            return Ok(());
        }

        println!(
            "  {} template{} in generation order:",
            templates.len(),
            if templates.len() == 1 { "" } else { "s" }
        );
        for (i, template) in templates.iter().enumerate() {
            let note = if template.uses_output_path() {
                ", not cached"
            } else {
                ""
            };
            println!(
                "    {}. {} (precedence {}{})",
                i + 1,
                template.id(),
                template.precedence(),
                note
            );
        }

        Ok(())
    }
}
