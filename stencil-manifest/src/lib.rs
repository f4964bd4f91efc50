//! stencil.toml parsing and manifest-declared templates.
//!
//! A manifest declares a project, placeholder values and a list of
//! templates. [`Manifest::templates`] turns the declarations into
//! [`FileTemplate`]s ready for a [`CodeGenerator`](stencil_codegen::CodeGenerator).

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod file;
mod manifest;
mod template;

pub use error::{Error, Result, SourceContext};
pub use file::StencilToml;
pub use manifest::{FileDecl, Manifest, ProjectConfig, TemplateDecl};
pub use template::{FileTemplate, Project};
