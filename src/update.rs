//! Schema update passes and their commit/preview outcome.
//!
//! Both update flavours run a single linear pass over a schema document's
//! features: a feature whose `name` matches the value source gets its
//! `allowed_values` replaced wholesale; everything else is left untouched.
//! Whether the mutated document is persisted is decided by the run
//! configuration: a dry run yields a `Preview` outcome carrying the would-be
//! changes, a live run yields `Committed` after the file is rewritten in
//! place.

use std::path::{Path, PathBuf};

use anyhow::Result;
use itertools::Itertools;
use log::info;
use serde_json::Value as JsonValue;

use crate::{
    data::{self, RawTable},
    mapping::IdMapping,
    schema::{ALLOWED_VALUES_KEY, NAME_KEY, SchemaDoc},
};

/// Dry-run previews list at most this many values per field.
pub const PREVIEW_VALUE_LIMIT: usize = 10;

/// One field whose `allowed_values` was (or would be) replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub name: String,
    pub values: Vec<JsonValue>,
}

/// Result of one update call against one schema document.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Dry run: nothing was written; `changes` is what a live run would apply.
    Preview {
        path: PathBuf,
        changes: Vec<FieldChange>,
        truncate: bool,
    },
    /// The schema file was rewritten in place.
    Committed { path: PathBuf, fields: usize },
}

/// Replaces `allowed_values` on every feature whose name is a mapping key.
pub fn apply_id_values(schema: &mut SchemaDoc, ids: &IdMapping) -> Vec<FieldChange> {
    replace_matching(schema, |name| {
        ids.ids_for(name)
            .map(|ids| ids.iter().copied().map(JsonValue::from).collect())
    })
}

/// Replaces `allowed_values` on every feature with a matching table column,
/// using the column's unique cleaned values.
pub fn apply_raw_unique_values(
    schema: &mut SchemaDoc,
    table: &RawTable,
    drop_missing_markers: bool,
) -> Vec<FieldChange> {
    replace_matching(schema, |name| {
        table.column(name).map(|cells| {
            data::column_unique_values(cells, drop_missing_markers)
                .iter()
                .map(data::RawValue::to_json)
                .collect()
        })
    })
}

fn replace_matching<F>(schema: &mut SchemaDoc, mut source: F) -> Vec<FieldChange>
where
    F: FnMut(&str) -> Option<Vec<JsonValue>>,
{
    let mut changes = Vec::new();
    for feature in schema.features_mut() {
        let Some(descriptor) = feature.as_object_mut() else {
            continue;
        };
        let Some(name) = descriptor
            .get(NAME_KEY)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
        else {
            continue;
        };
        if let Some(values) = source(&name) {
            descriptor.insert(
                ALLOWED_VALUES_KEY.to_string(),
                JsonValue::Array(values.clone()),
            );
            changes.push(FieldChange { name, values });
        }
    }
    changes
}

/// Updates one schema file from parsed identifier sets.
pub fn update_schema_with_ids(
    path: &Path,
    ids: &IdMapping,
    dry_run: bool,
) -> Result<UpdateOutcome> {
    let mut schema = SchemaDoc::load(path)?;
    let changes = apply_id_values(&mut schema, ids);
    finish(schema, path, changes, dry_run, false)
}

/// Updates one schema file from raw-dataset unique values.
pub fn update_schema_with_raw(
    path: &Path,
    table: &RawTable,
    drop_missing_markers: bool,
    dry_run: bool,
) -> Result<UpdateOutcome> {
    let mut schema = SchemaDoc::load(path)?;
    let changes = apply_raw_unique_values(&mut schema, table, drop_missing_markers);
    finish(schema, path, changes, dry_run, true)
}

fn finish(
    schema: SchemaDoc,
    path: &Path,
    changes: Vec<FieldChange>,
    dry_run: bool,
    truncate: bool,
) -> Result<UpdateOutcome> {
    if dry_run {
        return Ok(UpdateOutcome::Preview {
            path: path.to_path_buf(),
            changes,
            truncate,
        });
    }
    let fields = changes.len();
    schema.save(path)?;
    Ok(UpdateOutcome::Committed {
        path: path.to_path_buf(),
        fields,
    })
}

/// Logs a human-readable account of an update outcome.
pub fn report(outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::Preview {
            path,
            changes,
            truncate,
        } => {
            info!("[DRY RUN] Would update: {path:?}");
            for change in changes {
                info!("  - {}: {}", change.name, render_values(change, *truncate));
            }
        }
        UpdateOutcome::Committed { path, fields } => {
            info!("Updated: {path:?} ({fields} field(s))");
        }
    }
}

/// Renders a change's values for preview output, truncating long lists to the
/// first [`PREVIEW_VALUE_LIMIT`] entries followed by an ellipsis marker.
pub fn render_values(change: &FieldChange, truncate: bool) -> String {
    let shown = if truncate {
        change.values.len().min(PREVIEW_VALUE_LIMIT)
    } else {
        change.values.len()
    };
    let body = change.values[..shown].iter().join(", ");
    if shown < change.values.len() {
        format!("[{body}, ...]")
    } else {
        format!("[{body}]")
    }
}
