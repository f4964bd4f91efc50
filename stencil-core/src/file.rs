/// Header prepended to files that must not be edited by hand.
pub const DO_NOT_EDIT_HEADER: &str = "// Code generated by stencil. DO NOT EDIT.\n\n";

/// A file emitted by a template, before outputs sharing a path are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOutputFile {
    /// Path relative to the output directory
    pub path: String,
    /// File content
    pub content: String,
    /// Optional prefix written before the content
    pub header: Option<String>,
}

impl TemplateOutputFile {
    /// Create a new output file without a header
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            header: None,
        }
    }

    /// Set the header written before the content.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Mark the file as generated code with [`DO_NOT_EDIT_HEADER`].
    pub fn do_not_edit(self) -> Self {
        self.with_header(DO_NOT_EDIT_HEADER)
    }

    /// The bytes that end up on disk: header (if any) followed by content.
    pub fn render(&self) -> String {
        let header = self.header.as_deref().unwrap_or("");
        format!("{}{}", header, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_header() {
        let file = TemplateOutputFile::new("a.txt", "body");
        assert_eq!(file.render(), "body");
    }

    #[test]
    fn test_render_with_header() {
        let file = TemplateOutputFile::new("a.txt", "body").with_header("# top\n");
        assert_eq!(file.render(), "# top\nbody");
    }

    #[test]
    fn test_do_not_edit() {
        let file = TemplateOutputFile::new("client.ts", "export {};").do_not_edit();
        assert_eq!(file.header.as_deref(), Some(DO_NOT_EDIT_HEADER));
        assert!(file.render().starts_with("// Code generated by stencil"));
    }
}
