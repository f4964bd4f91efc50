//! Test utilities for template orchestration.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use eyre::{Result, eyre};
use stencil_core::TemplateOutputFile;

use crate::{GenerationConfig, Template, TemplateRef};

/// A template with scripted behaviour.
///
/// Emits a fixed list of files, optionally fails, and counts how many times
/// its generate operation ran. Clones share the counter.
pub struct StaticTemplate<C> {
    id: String,
    precedence: i32,
    uses_output_path: bool,
    cyclic: bool,
    failure: Option<String>,
    files: Vec<TemplateOutputFile>,
    dependencies: Vec<TemplateRef<C>>,
    calls: Arc<AtomicUsize>,
}

impl<C> Clone for StaticTemplate<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            precedence: self.precedence,
            uses_output_path: self.uses_output_path,
            cyclic: self.cyclic,
            failure: self.failure.clone(),
            files: self.files.clone(),
            dependencies: self.dependencies.clone(),
            calls: self.calls.clone(),
        }
    }
}

impl<C> StaticTemplate<C>
where
    C: Send + Sync + 'static,
{
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            precedence: 0,
            uses_output_path: false,
            cyclic: false,
            failure: None,
            files: Vec::new(),
            dependencies: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A template that lists itself as its only dependency.
    pub fn cyclic(id: impl Into<String>) -> TemplateRef<C> {
        let mut template = Self::new(id);
        template.cyclic = true;
        template.into_ref()
    }

    pub fn precedence(mut self, precedence: i32) -> Self {
        self.precedence = precedence;
        self
    }

    /// Append the output path to every emitted file and mark the template
    /// path-dependent.
    pub fn echo_out_path(mut self) -> Self {
        self.uses_output_path = true;
        self
    }

    pub fn file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push(TemplateOutputFile::new(path, content));
        self
    }

    pub fn output(mut self, file: TemplateOutputFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn depends_on(mut self, dependency: TemplateRef<C>) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Make every generate call fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Handle to the invocation counter.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn into_ref(self) -> TemplateRef<C> {
        Arc::new(self)
    }
}

#[async_trait]
impl<C> Template<C> for StaticTemplate<C>
where
    C: Send + Sync + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, config: &GenerationConfig<'_, C>) -> Result<Vec<TemplateOutputFile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(eyre!("{}", message));
        }

        if !self.uses_output_path {
            return Ok(self.files.clone());
        }

        let out_path = config.out_path.display().to_string();
        Ok(self
            .files
            .iter()
            .cloned()
            .map(|mut file| {
                file.content.push_str(&out_path);
                file
            })
            .collect())
    }

    fn dependencies(&self) -> Vec<TemplateRef<C>> {
        let mut dependencies = self.dependencies.clone();
        if self.cyclic {
            dependencies.push(Arc::new(self.clone()));
        }
        dependencies
    }

    fn precedence(&self) -> i32 {
        self.precedence
    }

    fn uses_output_path(&self) -> bool {
        self.uses_output_path
    }
}

/// Read a counter returned by [`StaticTemplate::calls`].
pub fn call_count(calls: &AtomicUsize) -> usize {
    calls.load(Ordering::SeqCst)
}
