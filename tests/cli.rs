mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

use common::TestWorkspace;

fn schema_allowed() -> Command {
    Command::cargo_bin("schema-allowed").expect("binary exists")
}

#[test]
fn ids_command_updates_every_schema_given() {
    let workspace = TestWorkspace::new();
    let mapping_path = workspace.write("ids_mapping.csv", common::SAMPLE_MAPPING);
    let raw_schema = workspace.write("raw_schema.json", common::SAMPLE_SCHEMA);
    let model_schema = workspace.write("model_schema.json", common::SAMPLE_SCHEMA);

    schema_allowed()
        .args([
            "ids",
            "-m",
            mapping_path.to_str().unwrap(),
            "-s",
            raw_schema.to_str().unwrap(),
            "-s",
            model_schema.to_str().unwrap(),
        ])
        .assert()
        .success();

    for path in [&raw_schema, &model_schema] {
        let text = fs::read_to_string(path).expect("read schema");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
        assert_eq!(
            value["features"][0]["allowed_values"],
            serde_json::json!([1, 3])
        );
        assert_eq!(
            value["features"][2]["allowed_values"],
            serde_json::json!(["keep", "me"])
        );
    }
}

#[test]
fn dry_run_previews_without_writing() {
    let workspace = TestWorkspace::new();
    let mapping_path = workspace.write("ids_mapping.csv", common::SAMPLE_MAPPING);
    let schema_path = workspace.write("schema.json", common::SAMPLE_SCHEMA);
    let before = fs::read(&schema_path).expect("read before");

    schema_allowed()
        .args([
            "--dry-run",
            "ids",
            "-m",
            mapping_path.to_str().unwrap(),
            "-s",
            schema_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(contains("DRY RUN"));

    let after = fs::read(&schema_path).expect("read after");
    assert_eq!(before, after);
}

#[test]
fn raw_command_applies_unique_column_values() {
    let workspace = TestWorkspace::new();
    let schema_path = workspace.write("schema.json", common::SAMPLE_SCHEMA);
    let csv_path = workspace.write("raw.csv", "race,weight\nB,100\n?,200\nA,100\nB,\n");

    schema_allowed()
        .args([
            "raw",
            "-i",
            csv_path.to_str().unwrap(),
            "-s",
            schema_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&schema_path).expect("read schema");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    assert_eq!(
        value["features"][1]["allowed_values"],
        serde_json::json!(["A", "B"])
    );
    // Columns without a matching feature are ignored.
    assert_eq!(
        value["features"][0]["allowed_values"],
        serde_json::json!([])
    );
}

#[test]
fn raw_command_can_keep_missing_markers() {
    let workspace = TestWorkspace::new();
    let schema_path = workspace.write("schema.json", common::SAMPLE_SCHEMA);
    let csv_path = workspace.write("raw.csv", "race\nB\n?\nA\n");

    schema_allowed()
        .args([
            "raw",
            "-i",
            csv_path.to_str().unwrap(),
            "-s",
            schema_path.to_str().unwrap(),
            "--keep-missing-markers",
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&schema_path).expect("read schema");
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    assert_eq!(
        value["features"][1]["allowed_values"],
        serde_json::json!(["?", "A", "B"])
    );
}

#[test]
fn sync_runs_the_full_pipeline() {
    let workspace = TestWorkspace::new();
    let mapping_path = workspace.write("ids_mapping.csv", common::SAMPLE_MAPPING);
    let raw_schema = workspace.write("raw_schema.json", common::SAMPLE_SCHEMA);
    let model_schema = workspace.write("model_schema.json", common::SAMPLE_SCHEMA);
    let csv_path = workspace.write(
        "data.csv",
        "race,admission_type_id\nA,1\n?,3\nB,1\n",
    );

    schema_allowed()
        .args([
            "sync",
            "-m",
            mapping_path.to_str().unwrap(),
            "-i",
            csv_path.to_str().unwrap(),
            "--raw-schema",
            raw_schema.to_str().unwrap(),
            "--model-schema",
            model_schema.to_str().unwrap(),
        ])
        .assert()
        .success();

    let raw_text = fs::read_to_string(&raw_schema).expect("read raw schema");
    let raw_value: serde_json::Value = serde_json::from_str(&raw_text).expect("valid JSON");
    // Raw schema only sees the mapping pass.
    assert_eq!(
        raw_value["features"][0]["allowed_values"],
        serde_json::json!([1, 3])
    );
    assert_eq!(
        raw_value["features"][1]["allowed_values"],
        serde_json::json!([])
    );

    let model_text = fs::read_to_string(&model_schema).expect("read model schema");
    let model_value: serde_json::Value = serde_json::from_str(&model_text).expect("valid JSON");
    // The raw-data pass keeps '?' markers by default, mirroring the refine step.
    assert_eq!(
        model_value["features"][1]["allowed_values"],
        serde_json::json!(["?", "A", "B"])
    );
    // Mapping values were then overwritten by raw-data uniques for matching columns.
    assert_eq!(
        model_value["features"][0]["allowed_values"],
        serde_json::json!([1, 3])
    );
}

#[test]
fn missing_mapping_file_fails_with_an_error() {
    let workspace = TestWorkspace::new();
    let schema_path = workspace.write("schema.json", common::SAMPLE_SCHEMA);

    schema_allowed()
        .args([
            "ids",
            "-m",
            workspace.path().join("absent.csv").to_str().unwrap(),
            "-s",
            schema_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("error:"));
}
