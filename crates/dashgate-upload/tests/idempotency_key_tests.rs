//! Tests idempotency key stability for upload requests.

use dashgate_upload::{FileHandle, idempotency_key_for_files};

#[test]
fn idempotency_key_tests_are_stable_and_order_sensitive() {
    let video = FileHandle::new("clip.mp4", 100, "video/mp4");
    let image = FileHandle::new("cover.png", 20, "image/png");

    let first = idempotency_key_for_files([&video, &image]);
    let second = idempotency_key_for_files([&video, &image]);
    let swapped = idempotency_key_for_files([&image, &video]);

    assert_eq!(first, second);
    assert_ne!(first, swapped);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn idempotency_key_tests_change_with_size() {
    let small = FileHandle::new("clip.mp4", 100, "video/mp4");
    let large = FileHandle::new("clip.mp4", 101, "video/mp4");

    assert_ne!(
        idempotency_key_for_files([&small]),
        idempotency_key_for_files([&large])
    );
}
