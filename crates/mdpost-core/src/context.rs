use crate::extensions::Registry;
use crate::options::RenderOptions;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FootnoteEntry {
    /// 1-based, in order of definition.
    pub index: usize,
    pub text: String,
}

/// Footnote definitions of one document, in definition order.
#[derive(Clone, Debug, Default)]
pub struct FootnoteMap {
    entries: Vec<(String, FootnoteEntry)>,
}

impl FootnoteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a definition and returns its index, or `None` if `id` is already defined.
    pub fn define(&mut self, id: &str, text: &str) -> Option<usize> {
        if self.contains(id) {
            return None;
        }
        let index = self.entries.len() + 1;
        self.entries.push((
            id.to_string(),
            FootnoteEntry {
                index,
                text: text.to_string(),
            },
        ));
        Some(index)
    }

    pub fn get(&self, id: &str) -> Option<&FootnoteEntry> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, entry)| entry)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FootnoteEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingEntry {
    pub text: String,
    pub depth: u8,
    /// 0-based position in the document.
    pub index: usize,
}

#[derive(Clone, Debug, Default)]
pub struct HeadingRegistry {
    entries: Vec<HeadingEntry>,
}

impl HeadingRegistry {
    pub fn push(&mut self, text: impl Into<String>, depth: u8) -> usize {
        let index = self.entries.len();
        self.entries.push(HeadingEntry {
            text: text.into(),
            depth: depth.clamp(1, 6),
            index,
        });
        index
    }

    pub fn entries(&self) -> &[HeadingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Citation {
    pub index: usize,
    pub title: String,
    pub url: String,
}

/// Outbound links collected while rendering, deduplicated by URL.
#[derive(Clone, Debug, Default)]
pub struct Citations {
    entries: Vec<Citation>,
}

impl Citations {
    pub fn add(&mut self, title: &str, url: &str) -> usize {
        if let Some(existing) = self.entries.iter().find(|entry| entry.url == url) {
            return existing.index;
        }
        let index = self.entries.len() + 1;
        self.entries.push(Citation {
            index,
            title: title.to_string(),
            url: url.to_string(),
        });
        index
    }

    pub fn entries(&self) -> &[Citation] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything one render accumulates. Created per document and dropped afterwards.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub options: &'a RenderOptions,
    pub registry: &'a Registry,
    pub footnotes: FootnoteMap,
    pub headings: HeadingRegistry,
    pub citations: Citations,
}

impl<'a> RenderContext<'a> {
    pub fn new(options: &'a RenderOptions, registry: &'a Registry) -> Self {
        Self {
            options,
            registry,
            footnotes: FootnoteMap::new(),
            headings: HeadingRegistry::default(),
            citations: Citations::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Citations, FootnoteMap};

    #[test]
    fn footnote_indices_follow_definition_order() {
        let mut map = FootnoteMap::new();
        assert_eq!(map.define("b", "second"), Some(1));
        assert_eq!(map.define("a", "first"), Some(2));
        assert_eq!(map.define("b", "again"), None);
        assert_eq!(map.get("b").map(|e| e.text.as_str()), Some("second"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn citations_dedupe_by_url() {
        let mut cites = Citations::default();
        assert_eq!(cites.add("Rust", "https://rust-lang.org"), 1);
        assert_eq!(cites.add("Docs", "https://docs.rs"), 2);
        assert_eq!(cites.add("Rust again", "https://rust-lang.org"), 1);
        assert_eq!(cites.entries().len(), 2);
    }
}
