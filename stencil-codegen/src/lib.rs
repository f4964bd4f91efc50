//! Template orchestration for the stencil code generator.
//!
//! This crate turns a forest of [`Template`]s into files on disk:
//!
//! - [`collect_templates`] - flattens templates and their dependencies into a
//!   de-duplicated, precedence-ordered list
//! - [`CodeGenerator`] - runs templates concurrently, caches their results and
//!   writes the merged output through an [`OutputSink`](stencil_core::OutputSink)
//! - [`merge_template_output`] - combines outputs that target the same path
//! - [`testing`] - scriptable templates for tests (feature-gated)

mod collector;
mod error;
mod generator;
mod merge;
mod template;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use collector::{DEFAULT_MAX_TEMPLATE_DEPTH, collect_templates};
pub use error::{Error, Result};
pub use generator::{CodeGenConfig, CodeGenerator, GenerateStats};
pub use merge::merge_template_output;
pub use stencil_core::{OutputSink, TemplateOutputFile};
pub use template::{GenerationConfig, Template, TemplateRef};
