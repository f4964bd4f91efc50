//! Core types for the stencil code generator.
//!
//! This crate provides the file record produced by templates and the
//! output sinks generated files are written through.

mod file;
mod sink;

pub use file::{DO_NOT_EDIT_HEADER, TemplateOutputFile};
pub use sink::{FileSystem, MemorySink, OutputSink};
