//! Templates declared in a manifest.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use indexmap::IndexMap;
use stencil_codegen::{GenerationConfig, Template, TemplateRef};
use stencil_core::TemplateOutputFile;

use crate::{FileDecl, TemplateDecl};

/// Resolved configuration passed to manifest templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub vars: IndexMap<String, String>,
}

/// All declarations of a manifest, by name.
///
/// Templates resolve their dependencies through the catalog rather than
/// holding each other, so `depends_on` cycles do not create reference cycles.
#[derive(Debug)]
pub(crate) struct Catalog {
    decls: IndexMap<String, TemplateDecl>,
}

impl Catalog {
    pub(crate) fn new(decls: &[TemplateDecl]) -> Self {
        Self {
            decls: decls
                .iter()
                .map(|decl| (decl.name.clone(), decl.clone()))
                .collect(),
        }
    }
}

/// A template emitting the files listed in its `[[templates]]` entry.
#[derive(Debug, Clone)]
pub struct FileTemplate {
    decl: TemplateDecl,
    catalog: Arc<Catalog>,
}

impl FileTemplate {
    pub(crate) fn new(decl: TemplateDecl, catalog: Arc<Catalog>) -> Self {
        Self { decl, catalog }
    }

    pub fn into_ref(self) -> TemplateRef<Project> {
        Arc::new(self)
    }

    async fn render_file(
        &self,
        file: &FileDecl,
        config: &GenerationConfig<'_, Project>,
    ) -> Result<TemplateOutputFile> {
        let raw = match (&file.content, &file.source) {
            (Some(content), _) => content.clone(),
            (None, Some(source)) => {
                let path = config.working_dir.join(source);
                tokio::fs::read_to_string(&path)
                    .await
                    .wrap_err_with(|| format!("failed to read '{}'", path.display()))?
            }
            (None, None) => return Err(eyre!("file '{}' has no content", file.path)),
        };

        let content = render(&raw, config)
            .wrap_err_with(|| format!("failed to render '{}'", file.path))?;

        let mut output = TemplateOutputFile::new(&file.path, content);
        if file.do_not_edit {
            output = output.do_not_edit();
        } else if let Some(header) = &file.header {
            output = output.with_header(header);
        }
        Ok(output)
    }
}

#[async_trait]
impl Template<Project> for FileTemplate {
    fn id(&self) -> &str {
        &self.decl.name
    }

    async fn generate(
        &self,
        config: &GenerationConfig<'_, Project>,
    ) -> Result<Vec<TemplateOutputFile>> {
        let mut files = Vec::with_capacity(self.decl.files.len());
        for file in &self.decl.files {
            files.push(self.render_file(file, config).await?);
        }
        Ok(files)
    }

    fn dependencies(&self) -> Vec<TemplateRef<Project>> {
        self.decl
            .depends_on
            .iter()
            .filter_map(|name| self.catalog.decls.get(name))
            .map(|decl| FileTemplate::new(decl.clone(), self.catalog.clone()).into_ref())
            .collect()
    }

    fn precedence(&self) -> i32 {
        self.decl.precedence
    }

    fn uses_output_path(&self) -> bool {
        self.decl.is_path_dependent()
    }
}

/// A piece of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    /// Placeholder key with surrounding whitespace trimmed.
    Placeholder(&'a str),
}

/// Split `text` into literal text and `{{key}}` placeholders.
///
/// An opening `{{` without a closing `}}` is literal text.
fn segments(text: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = text;
    let mut pending = None;

    std::iter::from_fn(move || {
        if let Some(key) = pending.take() {
            return Some(Segment::Placeholder(key));
        }
        if rest.is_empty() {
            return None;
        }

        let found = rest.find("{{").and_then(|start| {
            rest[start + 2..]
                .find("}}")
                .map(|end| (start, start + 2 + end))
        });
        match found {
            Some((start, end)) => {
                let literal = &rest[..start];
                let key = rest[start + 2..end].trim();
                rest = &rest[end + 2..];
                if literal.is_empty() {
                    Some(Segment::Placeholder(key))
                } else {
                    pending = Some(key);
                    Some(Segment::Text(literal))
                }
            }
            None => {
                let literal = rest;
                rest = "";
                Some(Segment::Text(literal))
            }
        }
    })
}

/// Keys of all placeholders in `text`, in order.
pub(crate) fn placeholders(text: &str) -> impl Iterator<Item = &str> {
    segments(text).filter_map(|segment| match segment {
        Segment::Placeholder(key) => Some(key),
        Segment::Text(_) => None,
    })
}

/// Substitute `{{name}}` placeholders.
///
/// Built-in names are `project`, `out_path` and `working_dir`; anything else
/// is looked up in the project vars. Unknown names are an error.
fn render(text: &str, config: &GenerationConfig<'_, Project>) -> Result<String> {
    let mut out = String::with_capacity(text.len());

    for segment in segments(text) {
        match segment {
            Segment::Text(literal) => out.push_str(literal),
            Segment::Placeholder("project") => out.push_str(&config.config.name),
            Segment::Placeholder("out_path") => {
                out.push_str(&config.out_path.display().to_string())
            }
            Segment::Placeholder("working_dir") => {
                out.push_str(&config.working_dir.display().to_string())
            }
            Segment::Placeholder(key) => match config.config.vars.get(key) {
                Some(value) => out.push_str(value),
                None => return Err(eyre!("undefined variable '{}'", key)),
            },
        }
    }

    Ok(out)
}
