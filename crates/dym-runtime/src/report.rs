//! Report generation
//!
//! Turns the registry of a finished run into the two-table document:
//! `sources` (id -> program text metadata) and `sections` (id -> location
//! metadata plus the merged profile data), cross-referenced by `sourceId`.

use crate::error::{MetricsError, MetricsResult};
use crate::session::MetricsSession;
use crate::source::{Source, SourceSection, Tag};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Id prefix of entries in the `sources` table
pub const SOURCE_ID_PREFIX: &str = "s-";
/// Id prefix of entries in the `sections` table
pub const SECTION_ID_PREFIX: &str = "ss-";

/// Entry of the `sources` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    pub mime_type: String,
    pub name: String,
    pub short_name: String,
}

/// Entry of the `sections` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionEntry {
    pub id: String,
    pub first_index: usize,
    pub length: usize,
    pub identifier: String,
    pub description: String,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// The exported document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub sources: BTreeMap<String, SourceEntry>,
    pub sections: BTreeMap<String, SectionEntry>,
    /// Deepest activation nesting of the run (logged, not exported)
    #[serde(skip)]
    pub max_stack_depth: usize,
}

/// Knobs for building the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub include_source_text: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_source_text: true,
        }
    }
}

impl MetricsReport {
    /// Build the document from a session. Reads only; may be called repeatedly.
    ///
    /// Ids are dense and zero-based. Sources are numbered by name and
    /// sections by (source, offset, length), so the same run always yields
    /// the same ids.
    pub fn build(session: &MetricsSession, options: &ReportOptions) -> Self {
        let registry = session.registry();

        let mut sections = registry.all_sections();
        sections.sort_by(|a, b| section_sort_key(a).cmp(&section_sort_key(b)));

        let mut source_ids: HashMap<Source, String> = HashMap::new();
        let mut sources = BTreeMap::new();
        for section in &sections {
            let source = section.source();
            if source_ids.contains_key(source) {
                continue;
            }
            let id = format!("{}{}", SOURCE_ID_PREFIX, source_ids.len());
            sources.insert(id.clone(), source_entry(source, &id, options));
            source_ids.insert(source.clone(), id);
        }

        let mut section_table = BTreeMap::new();
        for (index, section) in sections.iter().enumerate() {
            let id = format!("{}{}", SECTION_ID_PREFIX, index);
            let source_id = source_ids
                .get(section.source())
                .cloned()
                .unwrap_or_default();
            let entry = SectionEntry {
                id: id.clone(),
                first_index: section.char_index(),
                length: section.char_length(),
                identifier: section.identifier().to_string(),
                description: section.short_description().to_string(),
                source_id,
                tags: section.tags().to_vec(),
                data: registry.data_for(section),
            };
            section_table.insert(id, entry);
        }

        MetricsReport {
            sources,
            sections: section_table,
            max_stack_depth: session.max_stack_depth(),
        }
    }

    /// Serialize to JSON text
    pub fn to_json(&self, pretty: bool) -> MetricsResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// One-line summary for logs
    pub fn format_summary(&self) -> String {
        format!(
            "Dynamic metrics: {} source(s), {} section(s), max stack depth {}",
            self.sources.len(),
            self.sections.len(),
            self.max_stack_depth
        )
    }

    /// Write the document to `path`, replacing any previous file.
    ///
    /// The document is rendered in memory, written to a sibling temporary
    /// file and renamed over `path`. On failure neither a partial report nor
    /// the previous run's report is left behind.
    pub fn write_to(&self, path: &Path, pretty: bool) -> MetricsResult<()> {
        let mut json = self.to_json(pretty)?;
        json.push('\n');

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| MetricsError::io(parent, e))?;
            }
        }

        let tmp_path = temporary_path(path);
        if let Err(e) = write_file(&tmp_path, json.as_bytes()) {
            discard(&tmp_path, path);
            return Err(e);
        }
        fs::rename(&tmp_path, path).map_err(|e| {
            discard(&tmp_path, path);
            MetricsError::io(path, e)
        })
    }
}

/// A failed write must not leave an earlier run's report looking current.
fn discard(tmp_path: &Path, path: &Path) {
    let _ = fs::remove_file(tmp_path);
    let _ = fs::remove_file(path);
}

fn section_sort_key(section: &SourceSection) -> ((&str, &str, &str, &str), usize, usize) {
    (
        section.source().sort_key(),
        section.char_index(),
        section.char_length(),
    )
}

fn source_entry(source: &Source, id: &str, options: &ReportOptions) -> SourceEntry {
    SourceEntry {
        id: id.to_string(),
        source_text: options
            .include_source_text
            .then(|| source.text().to_string()),
        mime_type: source.mime_type().to_string(),
        name: source.name().to_string(),
        short_name: source.short_name().to_string(),
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> MetricsResult<()> {
    let mut file = File::create(path).map_err(|e| MetricsError::io(path, e))?;
    file.write_all(bytes).map_err(|e| MetricsError::io(path, e))?;
    file.sync_all().map_err(|e| MetricsError::io(path, e))
}
