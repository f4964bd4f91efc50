use std::path::PathBuf;

use thiserror::Error;

/// Result type for generation passes
pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// A template's generate operation failed. Nothing was written.
    #[error("template '{template}' failed to generate")]
    Template {
        template: String,
        #[source]
        source: BoxError,
    },

    /// The output sink could not persist a merged file.
    #[error("failed to write '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn template(template: impl Into<String>, source: eyre::Report) -> Self {
        Error::Template {
            template: template.into(),
            source: source.into(),
        }
    }

    /// Id of the failed template, if this is a template error.
    pub fn template_id(&self) -> Option<&str> {
        match self {
            Error::Template { template, .. } => Some(template),
            Error::Write { .. } => None,
        }
    }
}
