//! Integration tests for scrubbing shell input before it is logged.

use dashgate_app::redact_sensitive;

#[test]
fn log_redaction_tests_hide_login_password() {
    let redacted = redact_sensitive("login demo@example.com --password demo123");

    assert_eq!(redacted, "login demo@example.com --password=<redacted>");
}

#[test]
fn log_redaction_tests_cut_at_earliest_marker() {
    let redacted = redact_sensitive("login demo@example.com password=demo123 token=x");

    assert_eq!(redacted, "login demo@example.com password=<redacted>");
    assert!(!redacted.contains("demo123"));
}

#[test]
fn log_redaction_tests_bearer_header_loses_value() {
    let redacted = redact_sensitive("Authorization: Bearer s3cr3t");

    assert!(redacted.ends_with("<redacted>"));
    assert!(!redacted.contains("s3cr3t"));
}

#[test]
fn log_redaction_tests_leave_plain_text_alone() {
    assert_eq!(redact_sensitive("go /dashboard"), "go /dashboard");
}
