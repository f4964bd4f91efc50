//! The template abstraction.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use eyre::Result;
use stencil_core::TemplateOutputFile;

/// Shared handle to a template.
pub type TemplateRef<C> = Arc<dyn Template<C>>;

/// Configuration handed to every template during one generation pass.
#[derive(Debug)]
pub struct GenerationConfig<'a, C> {
    /// Resolved configuration supplied by the caller, read-only.
    pub config: &'a C,
    /// Directory generated paths are resolved against.
    pub out_path: &'a Path,
    /// Working directory of the invoking process.
    pub working_dir: &'a Path,
}

impl<C> Clone for GenerationConfig<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for GenerationConfig<'_, C> {}

/// A unit that produces output files from a shared configuration.
///
/// Templates are identified by [`Template::id`]: two instances reporting the
/// same id are treated as the same template when collecting and caching.
///
/// # Example
///
/// ```ignore
/// struct Readme;
///
/// #[async_trait]
/// impl Template<Project> for Readme {
///     fn id(&self) -> &str {
///         "readme"
///     }
///
///     async fn generate(&self, config: &GenerationConfig<'_, Project>) -> Result<Vec<TemplateOutputFile>> {
///         Ok(vec![TemplateOutputFile::new("README.md", format!("# {}", config.config.name))])
///     }
/// }
/// ```
#[async_trait]
pub trait Template<C>: Send + Sync {
    /// Stable identity used for de-duplication and caching.
    fn id(&self) -> &str;

    /// Produce this template's output files.
    async fn generate(&self, config: &GenerationConfig<'_, C>) -> Result<Vec<TemplateOutputFile>>;

    /// Templates that must be generated alongside this one.
    fn dependencies(&self) -> Vec<TemplateRef<C>> {
        Vec::new()
    }

    /// Ordering weight. Higher values are generated and merged first.
    fn precedence(&self) -> i32 {
        0
    }

    /// Whether the output depends on [`GenerationConfig::out_path`].
    ///
    /// Results of such templates are never cached.
    fn uses_output_path(&self) -> bool {
        false
    }
}
