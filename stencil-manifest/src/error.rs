use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Carries the manifest text and filename so validation code can build
/// diagnostics pointing into the file.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Span of the first quoted occurrence of `value`, e.g. `"models"`.
    pub fn find_quoted(&self, value: &str) -> Option<SourceSpan> {
        let needle = format!("\"{}\"", value);
        self.src
            .find(&needle)
            .map(|offset| SourceSpan::from((offset, needle.len())))
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    pub fn duplicate_template_error(&self, name: &str) -> Box<Error> {
        let needle = format!("\"{}\"", name);
        let span = self
            .src
            .rmatch_indices(&needle)
            .next()
            .map(|(offset, _)| SourceSpan::from((offset, needle.len())));
        Box::new(Error::DuplicateTemplate {
            src: self.named_source(),
            span,
            name: name.to_string(),
        })
    }

    pub fn unknown_dependency_error(&self, template: &str, dependency: &str) -> Box<Error> {
        Box::new(Error::UnknownDependency {
            src: self.named_source(),
            span: self.find_quoted(dependency),
            template: template.to_string(),
            dependency: dependency.to_string(),
        })
    }

    pub fn invalid_file_error(
        &self,
        template: &str,
        path: &str,
        reason: impl Into<String>,
    ) -> Box<Error> {
        Box::new(Error::InvalidFile {
            src: self.named_source(),
            span: self.find_quoted(path),
            template: template.to_string(),
            path: path.to_string(),
            reason: reason.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("create a stencil.toml or pass its location with --config"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stencil.toml")]
    #[diagnostic(code(stencil::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("template '{name}' is declared more than once")]
    #[diagnostic(
        code(stencil::duplicate_template),
        help("template names identify templates, rename one of them")
    )]
    DuplicateTemplate {
        #[source_code]
        src: NamedSource<String>,
        #[label("declared again here")]
        span: Option<SourceSpan>,
        name: String,
    },

    #[error("template '{template}' depends on unknown template '{dependency}'")]
    #[diagnostic(
        code(stencil::unknown_dependency),
        help("declare a [[templates]] entry named '{dependency}' or remove it from depends_on")
    )]
    UnknownDependency {
        #[source_code]
        src: NamedSource<String>,
        #[label("not declared")]
        span: Option<SourceSpan>,
        template: String,
        dependency: String,
    },

    #[error("invalid file '{path}' in template '{template}'")]
    #[diagnostic(code(stencil::invalid_file), help("{reason}"))]
    InvalidFile {
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: Option<SourceSpan>,
        template: String,
        path: String,
        reason: String,
    },
}
