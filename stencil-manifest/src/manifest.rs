//! Manifest types and parsing for stencil.toml files.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use indexmap::IndexMap;
use serde::Deserialize;
use stencil_codegen::TemplateRef;

use crate::{
    Error, FileTemplate, Project, Result, SourceContext,
    template::{Catalog, placeholders},
};

/// Root manifest for stencil.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Project metadata
    pub project: ProjectConfig,

    /// Values substituted into `{{name}}` placeholders
    #[serde(default)]
    pub vars: IndexMap<String, String>,

    /// Declared templates, in manifest order
    #[serde(default)]
    pub templates: Vec<TemplateDecl>,
}

/// The `[project]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,

    /// Output directory, relative to the manifest
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from(".")
}

/// A `[[templates]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateDecl {
    /// Template identity
    pub name: String,

    #[serde(default)]
    pub precedence: i32,

    /// Names of templates generated alongside this one
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Disable caching because output depends on the output directory.
    /// Implied when any inline content references `{{out_path}}`.
    #[serde(default)]
    pub uses_output_path: bool,

    #[serde(default)]
    pub files: Vec<FileDecl>,
}

impl TemplateDecl {
    /// Whether this template's output depends on the output directory.
    pub fn is_path_dependent(&self) -> bool {
        self.uses_output_path
            || self.files.iter().any(|file| {
                file.content
                    .as_deref()
                    .is_some_and(|content| placeholders(content).any(|key| key == "out_path"))
            })
    }
}

/// A `[[templates.files]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDecl {
    /// Output path, relative to the output directory
    pub path: String,

    /// Inline content
    pub content: Option<String>,

    /// Content file, relative to the working directory
    pub source: Option<PathBuf>,

    /// Custom header written before the content
    pub header: Option<String>,

    /// Prepend the generated-code header
    #[serde(default)]
    pub do_not_edit: bool,
}

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_str_with_filename(s, "stencil.toml")
    }
}

impl Manifest {
    /// Parse and validate a manifest, using `filename` in diagnostics.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        let ctx = SourceContext::new(content, filename);
        let manifest: Manifest = toml::from_str(content).map_err(|e| ctx.parse_error(e))?;
        manifest.validate(&ctx)?;
        Ok(manifest)
    }

    fn validate(&self, ctx: &SourceContext) -> Result<()> {
        let mut names = HashSet::new();
        for template in &self.templates {
            if !names.insert(template.name.as_str()) {
                return Err(ctx.duplicate_template_error(&template.name));
            }
        }

        for template in &self.templates {
            for dependency in &template.depends_on {
                if !names.contains(dependency.as_str()) {
                    return Err(ctx.unknown_dependency_error(&template.name, dependency));
                }
            }
            for file in &template.files {
                if let Some(reason) = validate_file(file) {
                    return Err(ctx.invalid_file_error(&template.name, &file.path, reason));
                }
            }
        }

        Ok(())
    }

    /// Look up a template declaration by name.
    pub fn template(&self, name: &str) -> Option<&TemplateDecl> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// The resolved configuration handed to templates.
    pub fn project(&self) -> Project {
        Project {
            name: self.project.name.clone(),
            vars: self.vars.clone(),
        }
    }

    /// Root templates, one per declaration.
    pub fn templates(&self) -> Vec<TemplateRef<Project>> {
        let catalog = Arc::new(Catalog::new(&self.templates));
        self.templates
            .iter()
            .map(|decl| FileTemplate::new(decl.clone(), catalog.clone()).into_ref())
            .collect()
    }

    /// Output directory resolved against the manifest directory.
    pub fn output_dir(&self, manifest_dir: &Path) -> PathBuf {
        manifest_dir.join(&self.project.output)
    }
}

fn validate_file(file: &FileDecl) -> Option<&'static str> {
    if file.path.trim().is_empty() {
        return Some("the output path must not be empty");
    }
    if Path::new(&file.path).is_absolute() {
        return Some("the output path must be relative");
    }
    if file.header.is_some() && file.do_not_edit {
        return Some("set either header or do_not_edit, not both");
    }
    match (&file.content, &file.source) {
        (Some(_), Some(_)) => Some("set either content or source, not both"),
        (None, None) => Some("set content or source"),
        _ => None,
    }
}
