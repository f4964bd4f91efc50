//! Core operations.
//!
//! This module contains the logic behind stencil commands,
//! separated from CLI argument parsing and output rendering.

pub mod generate;

pub use generate::generate;
