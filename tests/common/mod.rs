#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// A minimal schema document with one mapping-backed field, one raw-data
/// field, and one field no update source should ever touch.
pub const SAMPLE_SCHEMA: &str = r#"{
  "features": [
    { "name": "admission_type_id", "dtype": "int", "allowed_values": [] },
    { "name": "race", "dtype": "str", "allowed_values": [] },
    { "name": "unrelated_field", "dtype": "str", "allowed_values": ["keep", "me"] }
  ]
}
"#;

/// A mapping file with two sections separated by a blank line, including rows
/// the permissive parser must skip.
pub const SAMPLE_MAPPING: &str = "admission_type_id,description\n3,Elective\n1,Emergency\n,Unknown\nNaN,Not Mapped\n\ndischarge_disposition_id,description\n1,Discharged to home\n2,Short term hospital\n";
