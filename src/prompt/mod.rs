//! Filesystem-backed prompt templates, re-read on every use.

use std::fs;
use std::path::PathBuf;

use tracing::error;

/// The single substitution token a template may carry.
pub const PLACEHOLDER: &str = "{{INPUT}}";

/// One template per purpose, at `<root>/<purpose>/prompt.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Python code generation over the building dataset.
    Building,
    /// Adaptive Card rendering of an execution result.
    AdaptiveCard,
    /// Funny one-liner describing an area.
    DescribeFunny,
    /// Intent classification of an inbound message.
    Intent,
}

impl Purpose {
    pub fn dir_name(self) -> &'static str {
        match self {
            Purpose::Building => "building",
            Purpose::AdaptiveCard => "adaptiveCard",
            Purpose::DescribeFunny => "describefunny",
            Purpose::Intent => "intent",
        }
    }
}

/// Loads templates fresh on every call; nothing is cached across requests.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, purpose: Purpose) -> PathBuf {
        self.root.join(purpose.dir_name()).join("prompt.txt")
    }

    /// Read the template for `purpose` and fill it with `input`.
    ///
    /// A read failure degrades to an empty prompt rather than aborting the
    /// turn; the event is logged so an operator can spot a missing file.
    pub fn render(&self, purpose: Purpose, input: &str) -> String {
        let path = self.path_for(purpose);
        match fs::read_to_string(&path) {
            Ok(template) => fill(&template, input),
            Err(err) => {
                error!(path = %path.display(), %err, "failed to read prompt template");
                String::new()
            }
        }
    }
}

/// Substitute the first occurrence of [`PLACEHOLDER`]; templates without
/// one get the input appended instead.
pub fn fill(template: &str, input: &str) -> String {
    if template.contains(PLACEHOLDER) {
        template.replacen(PLACEHOLDER, input, 1)
    } else {
        format!("{}{}", template, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_with(purpose: Purpose, content: &str) -> (tempfile::TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        let purpose_dir = dir.path().join(purpose.dir_name());
        fs::create_dir_all(&purpose_dir).unwrap();
        fs::write(purpose_dir.join("prompt.txt"), content).unwrap();
        let store = TemplateStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn fill_replaces_placeholder_exactly_once() {
        let rendered = fill("Answer this: {{INPUT}} -- and nothing else", "how many areas?");
        assert_eq!(rendered.matches("how many areas?").count(), 1);
        assert!(!rendered.contains(PLACEHOLDER));
    }

    #[test]
    fn fill_replaces_only_the_first_placeholder() {
        let rendered = fill("{{INPUT}} / {{INPUT}}", "x");
        assert_eq!(rendered, "x / {{INPUT}}");
    }

    #[test]
    fn fill_appends_when_no_placeholder() {
        let rendered = fill("The area data follows:\n", "[{\"area_id\": 1}]");
        assert_eq!(rendered, "The area data follows:\n[{\"area_id\": 1}]");
    }

    #[test]
    fn render_substitutes_from_disk() {
        let (_dir, store) = store_with(Purpose::Building, "Question: {{INPUT}}");
        assert_eq!(store.render(Purpose::Building, "hi"), "Question: hi");
    }

    #[test]
    fn render_degrades_to_empty_on_missing_file() {
        let store = TemplateStore::new("/nonexistent/prompt/root");
        assert_eq!(store.render(Purpose::Intent, "hello"), "");
    }
}
