//! Program sources and the spans that probes attach to.
//!
//! A [`SourceSection`] is compared by span only (owning source, character
//! offset, character length). Two descriptors handed out by the engine for
//! the same span are therefore interchangeable as map keys, and whichever
//! was registered first keeps its identifier, description and tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::rc::Rc;

/// Syntactic categories the execution engine attaches to locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    /// Entry point of a callable body
    Root,
    /// Call whose target is not known until it executes
    UnspecifiedInvoke,
    InvokeWithLookup,
    NewObject,
    NewArray,
    /// Condition expression that decides a control-flow change
    ControlFlowCondition,
    FieldRead,
    FieldWrite,
    ArrayRead,
    ArrayWrite,
    LoopBody,
}

impl Tag {
    /// Every tag the tool knows about, instrumented or not
    pub const ALL: [Tag; 11] = [
        Tag::Root,
        Tag::UnspecifiedInvoke,
        Tag::InvokeWithLookup,
        Tag::NewObject,
        Tag::NewArray,
        Tag::ControlFlowCondition,
        Tag::FieldRead,
        Tag::FieldWrite,
        Tag::ArrayRead,
        Tag::ArrayWrite,
        Tag::LoopBody,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Tag::Root => "ROOT",
            Tag::UnspecifiedInvoke => "UNSPECIFIED_INVOKE",
            Tag::InvokeWithLookup => "INVOKE_WITH_LOOKUP",
            Tag::NewObject => "NEW_OBJECT",
            Tag::NewArray => "NEW_ARRAY",
            Tag::ControlFlowCondition => "CONTROL_FLOW_CONDITION",
            Tag::FieldRead => "FIELD_READ",
            Tag::FieldWrite => "FIELD_WRITE",
            Tag::ArrayRead => "ARRAY_READ",
            Tag::ArrayWrite => "ARRAY_WRITE",
            Tag::LoopBody => "LOOP_BODY",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
struct SourceData {
    name: String,
    short_name: String,
    mime_type: String,
    text: String,
}

/// One input program text. Cloning shares the underlying text.
#[derive(Debug, Clone)]
pub struct Source {
    data: Rc<SourceData>,
}

impl Source {
    /// Create a source; the short name is the last path component of `name`.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let short_name = Path::new(&name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        Self::from_parts(name, short_name, mime_type, text)
    }

    /// Create a source with an explicit short name
    pub fn from_parts(
        name: impl Into<String>,
        short_name: impl Into<String>,
        mime_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            data: Rc::new(SourceData {
                name: name.into(),
                short_name: short_name.into(),
                mime_type: mime_type.into(),
                text: text.into(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn short_name(&self) -> &str {
        &self.data.short_name
    }

    pub fn mime_type(&self) -> &str {
        &self.data.mime_type
    }

    /// Full program text
    pub fn text(&self) -> &str {
        &self.data.text
    }

    /// 1-based line of a character offset (offsets past the end map to the last line)
    pub fn line_of(&self, char_index: usize) -> usize {
        1 + self
            .data
            .text
            .chars()
            .take(char_index)
            .filter(|&c| c == '\n')
            .count()
    }

    /// Convenience for building a section of this source
    pub fn section(
        &self,
        char_index: usize,
        char_length: usize,
        identifier: impl Into<String>,
    ) -> SourceSection {
        SourceSection::new(self.clone(), char_index, char_length, identifier)
    }

    /// Deterministic ordering used when numbering sources in the report
    pub(crate) fn sort_key(&self) -> (&str, &str, &str, &str) {
        (self.name(), self.short_name(), self.mime_type(), self.text())
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data) || self.data == other.data
    }
}

impl Eq for Source {}

impl Hash for Source {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Consistent with `eq`: equal sources share name and text length.
        self.data.name.hash(state);
        self.data.text.len().hash(state);
    }
}

/// A contiguous span of a [`Source`] that can host a probe.
#[derive(Debug, Clone)]
pub struct SourceSection {
    source: Source,
    char_index: usize,
    char_length: usize,
    identifier: String,
    description: String,
    tags: Vec<Tag>,
}

impl SourceSection {
    /// Create an untagged section. The description defaults to
    /// `"<identifier> at <short name>:<line>"`.
    pub fn new(
        source: Source,
        char_index: usize,
        char_length: usize,
        identifier: impl Into<String>,
    ) -> Self {
        let identifier = identifier.into();
        let description = format!(
            "{} at {}:{}",
            identifier,
            source.short_name(),
            source.line_of(char_index)
        );
        Self {
            source,
            char_index,
            char_length,
            identifier,
            description,
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add tags; duplicates are dropped and the original order is kept
    pub fn with_tags(mut self, tags: &[Tag]) -> Self {
        for tag in tags {
            if !self.tags.contains(tag) {
                self.tags.push(*tag);
            }
        }
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    pub fn char_length(&self) -> usize {
        self.char_length
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn short_description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// 1-based line the section starts on
    pub fn start_line(&self) -> usize {
        self.source.line_of(self.char_index)
    }

    /// The spanned text (clamped to the end of the source)
    pub fn text(&self) -> String {
        self.source
            .text()
            .chars()
            .skip(self.char_index)
            .take(self.char_length)
            .collect()
    }
}

impl PartialEq for SourceSection {
    fn eq(&self, other: &Self) -> bool {
        self.char_index == other.char_index
            && self.char_length == other.char_length
            && self.source == other.source
    }
}

impl Eq for SourceSection {}

impl Hash for SourceSection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.char_index.hash(state);
        self.char_length.hash(state);
    }
}

impl fmt::Display for SourceSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}+{}]",
            self.source.short_name(),
            self.char_index,
            self.char_length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn source() -> Source {
        Source::new("/tmp/app/Hello.ns", "application/x-newspeak", "a := 1.\nb := a + 2.\n")
    }

    #[test]
    fn test_short_name_from_path() {
        assert_eq!(source().short_name(), "Hello.ns");
    }

    #[test]
    fn test_equal_sources_from_separate_handles() {
        let a = source();
        let b = source();
        assert_eq!(a, b);
        assert_ne!(a, Source::new("/tmp/app/Other.ns", "application/x-newspeak", "a := 1."));
    }

    #[test]
    fn test_line_of() {
        let s = source();
        assert_eq!(s.line_of(0), 1);
        assert_eq!(s.line_of(8), 2);
        assert_eq!(s.line_of(1000), 3);
    }

    #[test]
    fn test_section_equality_ignores_metadata() {
        let s = source();
        let first = s.section(8, 10, "b").with_tags(&[Tag::FieldWrite]);
        let again = s
            .section(8, 10, "other")
            .with_description("renamed")
            .with_tags(&[Tag::Root]);
        assert_eq!(first, again);

        let mut set = HashSet::new();
        set.insert(first);
        assert!(!set.insert(again));
        assert_eq!(set.iter().next().unwrap().identifier(), "b");
    }

    #[test]
    fn test_section_distinct_spans() {
        let s = source();
        assert_ne!(s.section(0, 6, "a"), s.section(0, 7, "a"));
        assert_ne!(s.section(0, 6, "a"), s.section(1, 6, "a"));
    }

    #[test]
    fn test_default_description() {
        let section = source().section(8, 10, "b");
        assert_eq!(section.short_description(), "b at Hello.ns:2");
        assert_eq!(section.start_line(), 2);
        assert_eq!(section.text(), "b := a + 2");
    }

    #[test]
    fn test_with_tags_dedups() {
        let section = source()
            .section(0, 1, "a")
            .with_tags(&[Tag::NewObject, Tag::NewArray, Tag::NewObject]);
        assert_eq!(section.tags(), &[Tag::NewObject, Tag::NewArray]);
        assert!(section.has_tag(Tag::NewArray));
        assert!(!section.has_tag(Tag::Root));
    }

    #[test]
    fn test_tag_serialization_names() {
        for tag in Tag::ALL {
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.as_str()));
        }
    }
}
