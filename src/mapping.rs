//! Parser for the sectioned identifier-mapping CSV.
//!
//! The mapping file groups `identifier,description` rows under section headers
//! of the form `<field_name>,description`, with blank lines closing a section.
//! Only the identifier column is consumed. The parser is permissive: rows with
//! empty, `nan`/`null`, or non-integer identifiers are skipped silently and
//! collected as diagnostics rather than raised as errors.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use anyhow::{Context, Result};

/// Suffix that marks a line as a section header.
const SECTION_HEADER_SUFFIX: &str = ",description";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyIdentifier,
    MissingMarker,
    NonNumeric,
}

/// One mapping row that was tolerated but not included in any identifier set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the mapping file.
    pub line_number: usize,
    pub section: String,
    pub reason: SkipReason,
}

/// Parsed mapping: per section name, the sorted set of unique identifiers,
/// plus the rows the permissive parse dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapping {
    pub sections: BTreeMap<String, Vec<i64>>,
    pub skipped: Vec<SkippedRow>,
}

impl IdMapping {
    pub fn ids_for(&self, field: &str) -> Option<&[i64]> {
        self.sections.get(field).map(Vec::as_slice)
    }
}

pub fn load(path: &Path) -> Result<IdMapping> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading mapping file {path:?}"))?;
    Ok(extract_sections(&text))
}

/// Parses the sectioned mapping text into identifier sets.
///
/// Guarantees: per section, the returned list has no duplicates and is sorted
/// ascending. Lines outside any section are ignored. Never fails.
pub fn extract_sections(text: &str) -> IdMapping {
    let mut sections: BTreeMap<String, BTreeSet<i64>> = BTreeMap::new();
    let mut skipped = Vec::new();
    let mut current: Option<String> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;
        if line.trim().is_empty() {
            current = None;
            continue;
        }
        if line.ends_with(SECTION_HEADER_SUFFIX) {
            // The suffix guarantees the header contains a comma.
            let name = line
                .split_once(',')
                .map_or(line, |(name, _)| name)
                .to_string();
            // A repeated header starts the section over rather than merging.
            sections.insert(name.clone(), BTreeSet::new());
            current = Some(name);
            continue;
        }
        let Some(section) = current.as_deref() else {
            continue;
        };
        let Some(id_raw) = first_csv_field(line) else {
            continue;
        };
        if id_raw.is_empty() {
            skipped.push(SkippedRow {
                line_number,
                section: section.to_string(),
                reason: SkipReason::EmptyIdentifier,
            });
            continue;
        }
        if id_raw.eq_ignore_ascii_case("nan") || id_raw.eq_ignore_ascii_case("null") {
            skipped.push(SkippedRow {
                line_number,
                section: section.to_string(),
                reason: SkipReason::MissingMarker,
            });
            continue;
        }
        match id_raw.parse::<i64>() {
            Ok(id) => {
                if let Some(ids) = sections.get_mut(section) {
                    ids.insert(id);
                }
            }
            Err(_) => skipped.push(SkippedRow {
                line_number,
                section: section.to_string(),
                reason: SkipReason::NonNumeric,
            }),
        }
    }

    IdMapping {
        sections: sections
            .into_iter()
            .map(|(name, ids)| (name, ids.into_iter().collect()))
            .collect(),
        skipped,
    }
}

/// Extracts the first field of a single CSV record, honouring quoting.
fn first_csv_field(line: &str) -> Option<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.get(0).map(|field| field.trim().to_string()),
        _ => None,
    }
}
