//! Merging of template outputs that target the same file.

use indexmap::IndexMap;
use stencil_core::TemplateOutputFile;

/// Combine outputs referring to the same path into one file each.
///
/// The first output for a path provides the header; later outputs have their
/// content appended after a blank line and their headers dropped. Runs of
/// three or more newlines are then collapsed to two. Paths keep the order in
/// which they first appear. The input is left untouched.
pub fn merge_template_output(files: &[TemplateOutputFile]) -> Vec<TemplateOutputFile> {
    let mut merged: IndexMap<&str, TemplateOutputFile> = IndexMap::new();

    for file in files {
        match merged.get_mut(file.path.as_str()) {
            Some(existing) => {
                existing.content.push_str("\n\n");
                existing.content.push_str(&file.content);
            }
            None => {
                merged.insert(file.path.as_str(), file.clone());
            }
        }
    }

    merged
        .into_values()
        .map(|mut file| {
            file.content = collapse_blank_lines(&file.content);
            file
        })
        .collect()
}

fn collapse_blank_lines(content: &str) -> String {
    let mut collapsed = content.to_string();
    while collapsed.contains("\n\n\n") {
        collapsed = collapsed.replace("\n\n\n", "\n\n");
    }
    collapsed
}
