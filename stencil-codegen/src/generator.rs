//! Generation orchestrator.

use std::{
    collections::HashMap,
    path::PathBuf,
    time::Instant,
};

use futures::stream::{FuturesUnordered, StreamExt};
use stencil_core::{FileSystem, OutputSink, TemplateOutputFile};

use crate::{
    DEFAULT_MAX_TEMPLATE_DEPTH, Error, GenerationConfig, Result, TemplateRef, collect_templates,
    merge_template_output,
};

/// Input of a generation pass.
pub struct CodeGenConfig<C> {
    /// Directory output paths are resolved against.
    pub base_path: PathBuf,
    /// Resolved configuration handed to every template.
    pub config: C,
    /// Root templates. Replaced by the collected set when a pass runs.
    pub templates: Vec<TemplateRef<C>>,
}

impl<C> CodeGenConfig<C> {
    pub fn new(base_path: impl Into<PathBuf>, config: C) -> Self {
        Self {
            base_path: base_path.into(),
            config,
            templates: Vec::new(),
        }
    }

    /// Add a root template.
    pub fn template(mut self, template: TemplateRef<C>) -> Self {
        self.templates.push(template);
        self
    }

    /// Add several root templates.
    pub fn templates(mut self, templates: impl IntoIterator<Item = TemplateRef<C>>) -> Self {
        self.templates.extend(templates);
        self
    }
}

/// Statistics from a generation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateStats {
    /// Number of templates after collection.
    pub templates: usize,
    /// Templates whose generate operation ran.
    pub generated: usize,
    /// Templates served from the cache.
    pub cache_hits: usize,
    /// Files handed to the sink, in write order.
    pub written: Vec<PathBuf>,
}

/// Runs templates and writes their merged output.
///
/// Results of templates that do not depend on the output path are cached by
/// template id for the lifetime of the generator, so repeated passes only
/// regenerate what is new or path-dependent.
///
/// # Example
///
/// ```ignore
/// let mut generator = CodeGenerator::new(std::env::current_dir()?);
/// let mut config = CodeGenConfig::new("generated", project).templates(roots);
///
/// let stats = generator.generate(&mut config).await?;
/// println!("wrote {} files", stats.written.len());
/// ```
#[derive(Debug)]
pub struct CodeGenerator {
    working_dir: PathBuf,
    max_depth: usize,
    cache: HashMap<String, Vec<TemplateOutputFile>>,
}

impl CodeGenerator {
    /// Create a generator for a process running in `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            max_depth: DEFAULT_MAX_TEMPLATE_DEPTH,
            cache: HashMap::new(),
        }
    }

    /// Bound dependency recursion during collection.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check whether a template's output is cached.
    pub fn is_cached(&self, template_id: &str) -> bool {
        self.cache.contains_key(template_id)
    }

    /// Number of cached template results.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Run a generation pass, writing to the filesystem.
    pub async fn generate<C>(&mut self, config: &mut CodeGenConfig<C>) -> Result<GenerateStats> {
        self.generate_with_sink(config, &FileSystem).await
    }

    /// Run a generation pass, writing through `sink`.
    ///
    /// All templates run concurrently. If any of them fails, the pass fails
    /// and nothing is written. Templates that finished before the failure stay
    /// cached. A failing write aborts the pass; files written before it remain.
    pub async fn generate_with_sink<C>(
        &mut self,
        config: &mut CodeGenConfig<C>,
        sink: &dyn OutputSink,
    ) -> Result<GenerateStats> {
        config.templates = collect_templates(&config.templates, self.max_depth);

        let working_dir = self.working_dir.clone();
        let generation_config = GenerationConfig {
            config: &config.config,
            out_path: &config.base_path,
            working_dir: &working_dir,
        };
        let templates = &config.templates;

        let mut stats = GenerateStats {
            templates: templates.len(),
            ..Default::default()
        };
        let mut results: Vec<Option<Vec<TemplateOutputFile>>> = vec![None; templates.len()];
        let mut pending = FuturesUnordered::new();

        for (index, template) in templates.iter().enumerate() {
            if let Some(cached) = self.cache.get(template.id()) {
                tracing::trace!(template = template.id(), "cache hit");
                results[index] = Some(cached.clone());
                stats.cache_hits += 1;
                continue;
            }

            tracing::trace!(template = template.id(), "generating");
            let generation_config = &generation_config;
            pending.push(async move {
                let started = Instant::now();
                let result = template.generate(generation_config).await;
                (index, result, started.elapsed())
            });
        }

        // Slots are filled by index, so completion order never leaks into the output.
        while let Some((index, result, elapsed)) = pending.next().await {
            let template = &templates[index];
            let files = result.map_err(|source| Error::template(template.id(), source))?;
            tracing::trace!(template = template.id(), ?elapsed, "generated");

            if !template.uses_output_path() {
                self.cache.insert(template.id().to_string(), files.clone());
            }
            results[index] = Some(files);
            stats.generated += 1;
        }

        let raw: Vec<TemplateOutputFile> = results.into_iter().flatten().flatten().collect();

        for file in merge_template_output(&raw) {
            let path = config.base_path.join(&file.path);
            sink.write_file(&path, &file.render())
                .map_err(|source| Error::Write {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(path = %path.display(), "updated");
            stats.written.push(path);
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::{io, path::Path, sync::Arc, time::Duration};

    use async_trait::async_trait;
    use eyre::eyre;
    use stencil_core::MemorySink;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        Template,
        testing::{StaticTemplate, call_count},
    };

    #[derive(Debug)]
    struct Settings {
        banner: String,
    }

    fn settings() -> Settings {
        Settings {
            banner: "petstore".to_string(),
        }
    }

    /// Waits before producing one file, or failing.
    struct DelayedTemplate {
        id: &'static str,
        precedence: i32,
        delay: Duration,
        content: Option<&'static str>,
    }

    #[async_trait]
    impl Template<Settings> for DelayedTemplate {
        fn id(&self) -> &str {
            self.id
        }

        async fn generate(
            &self,
            _config: &GenerationConfig<'_, Settings>,
        ) -> eyre::Result<Vec<TemplateOutputFile>> {
            tokio::time::sleep(self.delay).await;
            match self.content {
                Some(content) => Ok(vec![TemplateOutputFile::new("out.txt", content)]),
                None => Err(eyre!("{} exploded", self.id)),
            }
        }

        fn precedence(&self) -> i32 {
            self.precedence
        }
    }

    /// Renders the values it receives through the generation config.
    struct ConfigEcho;

    #[async_trait]
    impl Template<Settings> for ConfigEcho {
        fn id(&self) -> &str {
            "config-echo"
        }

        async fn generate(
            &self,
            config: &GenerationConfig<'_, Settings>,
        ) -> eyre::Result<Vec<TemplateOutputFile>> {
            let content = format!(
                "{}|{}|{}",
                config.config.banner,
                config.out_path.display(),
                config.working_dir.display()
            );
            Ok(vec![TemplateOutputFile::new("echo.txt", content)])
        }
    }

    /// Accepts a fixed number of writes, then fails.
    struct FlakySink {
        inner: MemorySink,
        budget: usize,
    }

    impl OutputSink for FlakySink {
        fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
            if self.inner.len() >= self.budget {
                return Err(io::Error::other("disk full"));
            }
            self.inner.write_file(path, content)
        }
    }

    #[tokio::test]
    async fn test_end_to_end_merges_by_precedence() {
        let sink = MemorySink::new();
        let mut generator = CodeGenerator::new("/work");
        let mut config = CodeGenConfig::new("/out", settings())
            .template(StaticTemplate::new("b").file("out.txt", "beta").into_ref())
            .template(
                StaticTemplate::new("a")
                    .precedence(1)
                    .file("out.txt", "alpha")
                    .into_ref(),
            );

        let stats = generator
            .generate_with_sink(&mut config, &sink)
            .await
            .unwrap();

        assert_eq!(stats.written, vec![PathBuf::from("/out/out.txt")]);
        let content = sink.get("/out/out.txt").unwrap();
        insta::assert_snapshot!(content, @"alpha\n\nbeta");
    }

    #[tokio::test]
    async fn test_templates_replaced_by_collected_set() {
        let shared = StaticTemplate::new("shared").precedence(2).into_ref();
        let mut config = CodeGenConfig::new("/out", settings())
            .template(StaticTemplate::new("root").depends_on(shared).into_ref());

        CodeGenerator::new("/work")
            .generate_with_sink(&mut config, &MemorySink::new())
            .await
            .unwrap();

        let ids: Vec<_> = config.templates.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["shared", "root"]);
    }

    #[tokio::test]
    async fn test_passes_generation_config() {
        let sink = MemorySink::new();
        let mut config = CodeGenConfig::new("/out", settings()).template(Arc::new(ConfigEcho));

        CodeGenerator::new("/work")
            .generate_with_sink(&mut config, &sink)
            .await
            .unwrap();

        assert_eq!(
            sink.get("/out/echo.txt").as_deref(),
            Some("petstore|/out|/work")
        );
    }

    #[tokio::test]
    async fn test_cache_reuses_results_across_passes() {
        let template = StaticTemplate::new("models").file("models.ts", "export {}");
        let calls = template.calls();
        let template = template.into_ref();
        let mut generator = CodeGenerator::new("/work");

        for _ in 0..2 {
            let mut config = CodeGenConfig::new("/out", settings()).template(template.clone());
            generator
                .generate_with_sink(&mut config, &MemorySink::new())
                .await
                .unwrap();
        }

        assert_eq!(call_count(&calls), 1);
        assert!(generator.is_cached("models"));
    }

    #[tokio::test]
    async fn test_cache_hit_keeps_positional_slot() {
        let mut generator = CodeGenerator::new("/work");
        let low = StaticTemplate::new("low").file("out.txt", "low").into_ref();
        let high = StaticTemplate::new("high")
            .precedence(5)
            .file("out.txt", "high")
            .into_ref();

        let mut first = CodeGenConfig::new("/out", settings()).template(low.clone());
        generator
            .generate_with_sink(&mut first, &MemorySink::new())
            .await
            .unwrap();

        let sink = MemorySink::new();
        let mut second = CodeGenConfig::new("/out", settings()).templates([low, high]);
        let stats = generator
            .generate_with_sink(&mut second, &sink)
            .await
            .unwrap();

        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.generated, 1);
        assert_eq!(sink.get("/out/out.txt").as_deref(), Some("high\n\nlow"));
    }

    #[tokio::test]
    async fn test_path_dependent_template_never_cached() {
        let template = StaticTemplate::new("paths")
            .echo_out_path()
            .file("paths.txt", "out=");
        let calls = template.calls();
        let template = template.into_ref();
        let mut generator = CodeGenerator::new("/work");
        let sink = MemorySink::new();

        for base in ["/one", "/two"] {
            let mut config = CodeGenConfig::new(base, settings()).template(template.clone());
            generator.generate_with_sink(&mut config, &sink).await.unwrap();
        }

        assert_eq!(call_count(&calls), 2);
        assert!(!generator.is_cached("paths"));
        assert_eq!(sink.get("/two/paths.txt").as_deref(), Some("out=/two"));
    }

    #[tokio::test]
    async fn test_failure_writes_nothing() {
        let sink = MemorySink::new();
        let mut config = CodeGenConfig::new("/out", settings())
            .template(StaticTemplate::new("good").file("a.txt", "a").into_ref())
            .template(StaticTemplate::new("bad").failing("boom").into_ref())
            .template(StaticTemplate::new("other").file("b.txt", "b").into_ref());

        let err = CodeGenerator::new("/work")
            .generate_with_sink(&mut config, &sink)
            .await
            .unwrap_err();

        assert_eq!(err.template_id(), Some("bad"));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_successes_cached() {
        let mut generator = CodeGenerator::new("/work");
        let mut config = CodeGenConfig::new("/out", settings())
            .template(Arc::new(DelayedTemplate {
                id: "fast",
                precedence: 0,
                delay: Duration::ZERO,
                content: Some("fast"),
            }))
            .template(Arc::new(DelayedTemplate {
                id: "slow-failure",
                precedence: 0,
                delay: Duration::from_millis(50),
                content: None,
            }));

        let result = generator
            .generate_with_sink(&mut config, &MemorySink::new())
            .await;

        assert!(matches!(result, Err(Error::Template { .. })));
        assert!(generator.is_cached("fast"));
        assert!(!generator.is_cached("slow-failure"));
    }

    #[tokio::test]
    async fn test_completion_order_does_not_affect_output() {
        let sink = MemorySink::new();
        let mut config = CodeGenConfig::new("/out", settings())
            .template(Arc::new(DelayedTemplate {
                id: "quick",
                precedence: 0,
                delay: Duration::ZERO,
                content: Some("quick"),
            }))
            .template(Arc::new(DelayedTemplate {
                id: "sluggish",
                precedence: 3,
                delay: Duration::from_millis(30),
                content: Some("sluggish"),
            }));

        CodeGenerator::new("/work")
            .generate_with_sink(&mut config, &sink)
            .await
            .unwrap();

        assert_eq!(
            sink.get("/out/out.txt").as_deref(),
            Some("sluggish\n\nquick")
        );
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let sink = FlakySink {
            inner: MemorySink::new(),
            budget: 1,
        };
        let mut config = CodeGenConfig::new("/out", settings())
            .template(
                StaticTemplate::new("t")
                    .file("a.txt", "a")
                    .file("b.txt", "b")
                    .into_ref(),
            );

        let err = CodeGenerator::new("/work")
            .generate_with_sink(&mut config, &sink)
            .await
            .unwrap_err();

        match err {
            Error::Write { path, .. } => assert_eq!(path, PathBuf::from("/out/b.txt")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.inner.get("/out/a.txt").as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_no_templates_writes_nothing() {
        let sink = MemorySink::new();
        let mut config = CodeGenConfig::<Settings>::new("/out", settings());

        let stats = CodeGenerator::new("/work")
            .generate_with_sink(&mut config, &sink)
            .await
            .unwrap();

        assert_eq!(stats, GenerateStats::default());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_generate_writes_to_filesystem_with_header() {
        let temp = TempDir::new().unwrap();
        let mut config = CodeGenConfig::new(temp.path(), settings()).template(
            StaticTemplate::new("client")
                .output(TemplateOutputFile::new("src/client.ts", "export {};").do_not_edit())
                .into_ref(),
        );

        CodeGenerator::new(temp.path())
            .generate(&mut config)
            .await
            .unwrap();

        let written = std::fs::read_to_string(temp.path().join("src/client.ts")).unwrap();
        assert_eq!(
            written,
            "// Code generated by stencil. DO NOT EDIT.\n\nexport {};"
        );
    }
}
