//! Integration tests for the codex CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a codex command
fn codex() -> Command {
    let mut cmd = Command::cargo_bin("codex").unwrap();
    cmd.env_remove("CODEX_PROJECT")
        .env_remove("CODEX_CONTENT_DIR")
        .env_remove("CODEX_IMAGE_DIR")
        .env_remove("CODEX_DEFAULT_AFFILIATION")
        .env_remove("CODEX_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    codex().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

fn records_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("src/content/characters")
}

fn images_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("public/images/characters")
}

fn add_image(tmp: &TempDir, name: &str, bytes: &[u8]) {
    fs::write(images_dir(tmp).join(name), bytes).unwrap();
}

fn write_record(tmp: &TempDir, id: &str, value: &Value) {
    fs::write(
        records_dir(tmp).join(format!("{}.json", id)),
        serde_json::to_string_pretty(value).unwrap(),
    )
    .unwrap();
}

fn read_record(tmp: &TempDir, id: &str) -> Value {
    let text = fs::read_to_string(records_dir(tmp).join(format!("{}.json", id))).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn v2_record(id: &str) -> Value {
    json!({
        "id": id,
        "characterName": "Yi Sang",
        "identityName": "LCB Sinner",
        "isDefault": true,
        "grade": 1,
        "releaseDate": "2023-02-27",
        "imagePosition": "top",
        "keywords": ["Sinking"],
        "skills": {
            "skill1": { "type": "Slash", "attribute": "Gloom" },
            "skill2": { "type": "Pierce", "attribute": "Envy" },
            "skill3": { "type": "Slash", "attribute": "Sloth" }
        },
        "defense": { "type": "Evade", "attribute": "Gloom" },
        "affiliation": ["Limbus Company"],
        "image_url": format!("/images/characters/{}.png", id)
    })
}

fn v1_record(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Faust",
        "affiliation": "Limbus Company, LCB",
        "weapon": "Zweihander",
        "image_url": format!("/images/characters/{}.png", id)
    })
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    codex()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("schema"));
}

#[test]
fn test_version_displays() {
    codex()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("codex"));
}

#[test]
fn test_completions_bash() {
    codex()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("codex"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    codex()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .failure();
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_structure() {
    let tmp = setup_test_project();
    assert!(tmp.path().join(".codex/config.yaml").is_file());
    assert!(records_dir(&tmp).is_dir());
    assert!(images_dir(&tmp).is_dir());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();
    codex()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Validate Tests
// ============================================================================

#[test]
fn test_validate_empty_project() {
    let tmp = setup_test_project();
    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed validation!"));
}

#[test]
fn test_validate_valid_record() {
    let tmp = setup_test_project();
    write_record(&tmp, "yisang_01", &v2_record("yisang_01"));

    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files passed:"))
        .stdout(predicate::str::contains("All files passed validation!"));
}

#[test]
fn test_validate_scalar_affiliation_fails() {
    let tmp = setup_test_project();
    let mut record = v2_record("yisang_01");
    record["affiliation"] = json!("Limbus Company");
    write_record(&tmp, "yisang_01", &record);

    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("affiliation"));
}

#[test]
fn test_validate_special_without_attribute_fails() {
    let tmp = setup_test_project();
    let mut record = v2_record("yisang_01");
    record["skills"]["special1"] = json!({ "type": "Slash" });
    write_record(&tmp, "yisang_01", &record);

    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("attribute"));
}

#[test]
fn test_validate_keep_going_reports_every_file() {
    let tmp = setup_test_project();
    let mut bad = v2_record("a");
    bad["grade"] = json!("three");
    write_record(&tmp, "a", &bad);
    write_record(&tmp, "b", &bad);

    codex()
        .current_dir(tmp.path())
        .args(["validate", "--keep-going"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 files have errors"));
}

#[test]
fn test_validate_explicit_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("yisang_01.json");
    fs::write(&path, serde_json::to_string(&v2_record("yisang_01")).unwrap()).unwrap();

    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_validate_fix_writes_default_image_position() {
    let tmp = setup_test_project();
    let mut record = v2_record("yisang_01");
    record.as_object_mut().unwrap().remove("imagePosition");
    write_record(&tmp, "yisang_01", &record);

    codex()
        .current_dir(tmp.path())
        .args(["validate", "--fix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files fixed:"));

    assert_eq!(read_record(&tmp, "yisang_01")["imagePosition"], "center");
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let tmp = setup_test_project();
    let mut record = v2_record("yisang_01");
    record["releaseDate"] = json!("");
    write_record(&tmp, "yisang_01", &record);

    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success();

    codex()
        .current_dir(tmp.path())
        .args(["validate", "--strict"])
        .assert()
        .failure();
}

#[test]
fn test_validate_legacy_record_reports_migrate_hint() {
    let tmp = setup_test_project();
    write_record(&tmp, "faust_01", &v1_record("faust_01"));

    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("codex migrate"));
}

#[test]
fn test_validate_quiet_omits_summary() {
    let tmp = setup_test_project();
    write_record(&tmp, "yisang_01", &v2_record("yisang_01"));

    codex()
        .current_dir(tmp.path())
        .args(["validate", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation Summary").not())
        .stdout(predicate::str::contains("All files passed").not());

    let mut broken = v2_record("yisang_01");
    broken["affiliation"] = json!("Limbus Company");
    write_record(&tmp, "yisang_01", &broken);

    codex()
        .current_dir(tmp.path())
        .args(["validate", "-q"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Validation Summary").not())
        .stderr(predicate::str::contains("Validation failed"));
}

// ============================================================================
// Migrate Tests
// ============================================================================

#[test]
fn test_migrate_rewrites_v1_record() {
    let tmp = setup_test_project();
    write_record(&tmp, "faust_01", &v1_record("faust_01"));
    write_record(&tmp, "yisang_01", &v2_record("yisang_01"));

    codex()
        .current_dir(tmp.path())
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated"));

    let migrated = read_record(&tmp, "faust_01");
    assert_eq!(migrated["characterName"], "Faust");
    assert_eq!(migrated["identityName"], "Faust");
    assert_eq!(migrated["affiliation"], json!(["Limbus Company", "LCB"]));
    assert_eq!(migrated["keywords"], json!(["Zweihander"]));
    assert_eq!(migrated["imagePosition"], "center");
    assert!(migrated.get("name").is_none());

    // The v2 record is left alone
    assert_eq!(read_record(&tmp, "yisang_01"), v2_record("yisang_01"));

    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success();
}

#[test]
fn test_migrated_placeholders_fail_strict_validation() {
    let tmp = setup_test_project();
    write_record(&tmp, "faust_01", &v1_record("faust_01"));

    codex()
        .current_dir(tmp.path())
        .args(["migrate", "--release-date", "2023-02-27"])
        .assert()
        .success();

    codex()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("/skills/skill1"))
        .stdout(predicate::str::contains("/defense"));

    codex()
        .current_dir(tmp.path())
        .args(["validate", "--strict"])
        .assert()
        .failure();
}

#[test]
fn test_migrate_explicit_path_uses_project_flag_config() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join(".codex/config.yaml"),
        "default_affiliation: N Corp\n",
    )
    .unwrap();
    let mut record = v1_record("faust_01");
    record["affiliation"] = json!("");
    write_record(&tmp, "faust_01", &record);

    let elsewhere = TempDir::new().unwrap();
    let record_path = records_dir(&tmp).join("faust_01.json");

    codex()
        .current_dir(elsewhere.path())
        .arg("--project")
        .arg(tmp.path())
        .arg("migrate")
        .arg(&record_path)
        .assert()
        .success();

    assert_eq!(read_record(&tmp, "faust_01")["affiliation"], json!(["N Corp"]));
}

#[test]
fn test_migrate_dry_run_writes_nothing() {
    let tmp = setup_test_project();
    write_record(&tmp, "faust_01", &v1_record("faust_01"));

    codex()
        .current_dir(tmp.path())
        .args(["migrate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would migrate"));

    assert_eq!(read_record(&tmp, "faust_01"), v1_record("faust_01"));
}

#[test]
fn test_migrate_uses_given_release_date() {
    let tmp = setup_test_project();
    write_record(&tmp, "faust_01", &v1_record("faust_01"));

    codex()
        .current_dir(tmp.path())
        .args(["migrate", "--release-date", "2023-02-27", "--grade", "2"])
        .assert()
        .success();

    let migrated = read_record(&tmp, "faust_01");
    assert_eq!(migrated["releaseDate"], "2023-02-27");
    assert_eq!(migrated["grade"], json!(2));
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_status_and_next() {
    let tmp = setup_test_project();
    add_image(&tmp, "a.png", b"a");
    add_image(&tmp, "b.png", b"b");
    add_image(&tmp, "c.png", b"c");
    write_record(&tmp, "a", &v2_record("a"));

    codex()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resume at image 2 of 3"));

    codex()
        .current_dir(tmp.path())
        .args(["next", "-f", "id"])
        .assert()
        .success()
        .stdout("b\n");
}

#[test]
fn test_status_json() {
    let tmp = setup_test_project();
    add_image(&tmp, "a.png", b"a");

    let output = codex()
        .current_dir(tmp.path())
        .args(["status", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["total_images"], 1);
    assert_eq!(status["pending"], 1);
    assert_eq!(status["resume_index"], 0);
}

#[test]
fn test_cleanup_removes_orphans() {
    let tmp = setup_test_project();
    add_image(&tmp, "a.png", b"a");
    write_record(&tmp, "a", &v2_record("a"));
    write_record(&tmp, "gone", &v2_record("gone"));

    codex()
        .current_dir(tmp.path())
        .args(["cleanup", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gone"));
    assert!(records_dir(&tmp).join("gone.json").exists());

    codex()
        .current_dir(tmp.path())
        .arg("cleanup")
        .assert()
        .success();
    assert!(!records_dir(&tmp).join("gone.json").exists());
    assert!(records_dir(&tmp).join("a.json").exists());
}

#[test]
fn test_dupes_finds_identical_images() {
    let tmp = setup_test_project();
    add_image(&tmp, "a.png", b"same bytes");
    add_image(&tmp, "b.png", b"other");
    add_image(&tmp, "c.png", b"same bytes");

    codex()
        .current_dir(tmp.path())
        .args(["dupes", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c.png"))
        .stdout(predicate::str::contains("b.png").not());
}

#[test]
fn test_remove_deletes_image_and_record() {
    let tmp = setup_test_project();
    add_image(&tmp, "a.png", b"a");
    write_record(&tmp, "a", &v2_record("a"));

    codex()
        .current_dir(tmp.path())
        .args(["remove", "a"])
        .assert()
        .success();
    assert!(!images_dir(&tmp).join("a.png").exists());
    assert!(!records_dir(&tmp).join("a.json").exists());

    codex()
        .current_dir(tmp.path())
        .args(["remove", "a"])
        .assert()
        .failure();
}

#[test]
fn test_remove_rejects_path_ids() {
    let tmp = setup_test_project();
    let outside = tmp.path().join("src/content/keep.json");
    fs::write(&outside, "{}").unwrap();

    codex()
        .current_dir(tmp.path())
        .args(["remove", "../keep"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid id"));
    assert!(outside.exists());
}

// ============================================================================
// New / List Tests
// ============================================================================

fn new_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec![
        "new",
        "--name",
        "Yi Sang",
        "--skill",
        "Slash:Gloom",
        "--skill",
        "Pierce:Envy",
        "--skill",
        "Slash:Sloth",
        "--defense",
        "Evade:Gloom",
    ];
    args.extend_from_slice(extra);
    args
}

#[test]
fn test_new_writes_valid_record() {
    let tmp = setup_test_project();
    add_image(&tmp, "yisang_01.png", b"img");

    codex()
        .current_dir(tmp.path())
        .args(new_args(&["yisang_01.png", "--keyword", "Sinking,Sinking"]))
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let record = read_record(&tmp, "yisang_01");
    assert_eq!(record["id"], "yisang_01");
    assert_eq!(record["identityName"], "Yi Sang");
    assert_eq!(record["imagePosition"], "center");
    assert_eq!(record["image_url"], "/images/characters/yisang_01.png");
    assert_eq!(record["affiliation"], json!(["림버스 컴퍼니"]));
    assert_eq!(record["keywords"], json!(["Sinking"]));

    codex()
        .current_dir(tmp.path())
        .args(["validate"])
        .assert()
        .success();
}

#[test]
fn test_new_defaults_to_next_pending_image() {
    let tmp = setup_test_project();
    add_image(&tmp, "a.png", b"a");
    add_image(&tmp, "b.png", b"b");
    write_record(&tmp, "a", &v2_record("a"));

    codex()
        .current_dir(tmp.path())
        .args(new_args(&[]))
        .assert()
        .success();
    assert!(records_dir(&tmp).join("b.json").exists());
}

#[test]
fn test_new_refuses_to_overwrite() {
    let tmp = setup_test_project();
    add_image(&tmp, "a.png", b"a");
    write_record(&tmp, "a", &v2_record("a"));

    codex()
        .current_dir(tmp.path())
        .args(new_args(&["a.png"]))
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    codex()
        .current_dir(tmp.path())
        .args(new_args(&["a.png", "--force"]))
        .assert()
        .success();
}

#[test]
fn test_new_rejects_two_skills() {
    let tmp = setup_test_project();
    add_image(&tmp, "a.png", b"a");

    codex()
        .current_dir(tmp.path())
        .args([
            "new", "a.png", "--name", "Yi Sang", "--skill", "Slash:Gloom", "--skill",
            "Pierce:Envy", "--defense", "Evade:Gloom",
        ])
        .assert()
        .failure();
    assert!(!records_dir(&tmp).join("a.json").exists());
}

#[test]
fn test_list_ids_include_legacy_records() {
    let tmp = setup_test_project();
    write_record(&tmp, "yisang_01", &v2_record("yisang_01"));
    write_record(&tmp, "faust_01", &v1_record("faust_01"));

    codex()
        .current_dir(tmp.path())
        .args(["list", "-f", "id"])
        .assert()
        .success()
        .stdout("faust_01\nyisang_01\n");

    codex()
        .current_dir(tmp.path())
        .args(["list", "-f", "id", "--legacy"])
        .assert()
        .success()
        .stdout("faust_01\n");
}

#[test]
fn test_list_json_uses_current_shape() {
    let tmp = setup_test_project();
    write_record(&tmp, "faust_01", &v1_record("faust_01"));

    let output = codex()
        .current_dir(tmp.path())
        .args(["list", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let records: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records[0]["characterName"], "Faust");
    assert_eq!(records[0]["affiliation"], json!(["Limbus Company", "LCB"]));
}

// ============================================================================
// Schema Tests
// ============================================================================

#[test]
fn test_schema_list() {
    codex()
        .args(["schema", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("characters"))
        .stdout(predicate::str::contains("v1, v2"));
}

#[test]
fn test_schema_list_json() {
    let output = codex().args(["schema", "list", "-f", "json"]).output().unwrap();
    assert!(output.status.success());

    let collections: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(collections["characters"]["type"], "data");
    assert_eq!(collections["characters"]["current"], "v2");
}

#[test]
fn test_schema_show_fields() {
    codex()
        .args(["schema", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("imagePosition"))
        .stdout(predicate::str::contains("\"center\""))
        .stdout(predicate::str::contains("skills.special1.attribute"));
}

#[test]
fn test_schema_show_v1_raw() {
    codex()
        .args(["schema", "show", "characters", "--version", "v1", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weapon"));
}

#[test]
fn test_schema_show_unknown_collection() {
    codex()
        .args(["schema", "show", "weapons"])
        .assert()
        .failure();
}
