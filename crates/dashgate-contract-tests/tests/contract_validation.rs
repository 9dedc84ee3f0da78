//! Checks persisted records and dashboard documents against the frozen
//! schemas under `contracts/`.

use dashgate_core::{FileStore, ThemeMode, User, write_session_record, write_theme};
use dashgate_dashboard::default_dashboard;
use jsonschema::JSONSchema;
use serde_json::{Value, json};

const CONTRACTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts");

fn load_json(relative: &str) -> Value {
    let raw = std::fs::read_to_string(format!("{CONTRACTS}/{relative}"))
        .expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

fn compile_validator(schema: &str) -> JSONSchema {
    JSONSchema::compile(&load_json(schema)).expect("schema should compile")
}

#[test]
fn fixtures_match_their_schemas() {
    for (schema, fixture) in [
        ("dashboard.schema.json", "fixtures/dashboard.valid.json"),
        ("session-user.schema.json", "fixtures/session-user.valid.json"),
        ("storage.schema.json", "fixtures/storage.valid.json"),
    ] {
        let validator = compile_validator(schema);
        assert!(
            validator.is_valid(&load_json(fixture)),
            "{fixture} should validate against {schema}"
        );
    }
}

#[test]
fn built_in_dashboard_matches_schema() {
    let validator = compile_validator("dashboard.schema.json");
    let document = serde_json::to_value(default_dashboard()).expect("dashboard should serialize");

    assert!(validator.is_valid(&document));
}

#[test]
fn serialized_user_matches_schema() {
    let validator = compile_validator("session-user.schema.json");
    let document = serde_json::to_value(User::new("demo@example.com", "David"))
        .expect("user should serialize");

    assert!(validator.is_valid(&document));
    assert!(!validator.is_valid(&json!({ "email": "demo@example.com" })));
}

#[test]
fn written_storage_file_matches_schema() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("storage.json");
    let store = FileStore::open(&path).expect("missing file opens empty");
    write_session_record(&store, &User::new("demo@example.com", "David"))
        .expect("session should persist");
    write_theme(&store, ThemeMode::Dark).expect("theme should persist");

    let raw = std::fs::read_to_string(&path).expect("storage file should exist");
    let document: Value = serde_json::from_str(&raw).expect("storage file should be json");

    assert!(compile_validator("storage.schema.json").is_valid(&document));
}

#[test]
fn storage_schema_rejects_unknown_theme() {
    let validator = compile_validator("storage.schema.json");
    assert!(!validator.is_valid(&json!({ "theme": "sepia" })));
    assert!(!validator.is_valid(&json!({ "isAuthenticated": "yes" })));
}
