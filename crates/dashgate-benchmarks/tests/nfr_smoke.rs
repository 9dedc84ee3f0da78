//! Latency smoke test for validation, size labels and dashboard assembly.

use std::time::Instant;

use dashgate_dashboard::default_dashboard;
use dashgate_upload::{
    FileHandle, Slot, format_file_size, idempotency_key_for_files, validate_file_type,
};

#[test]
fn benchmark_upload_and_dashboard_smoke_prints_latency() {
    let names = ["clip.mp4", "CLIP.MOV", "notes.txt", "archive", "cover.jpeg", "subs.vtt"];
    let files: Vec<FileHandle> = (0..3_u64)
        .map(|index| FileHandle::new(format!("file-{index}.mp4"), index * 1_048_576, "video/mp4"))
        .collect();

    let start = Instant::now();
    let mut valid = 0usize;
    let mut label_len = 0usize;
    let mut key_len = 0usize;

    for round in 0..1_000_u64 {
        for name in names {
            for slot in Slot::ALL {
                if validate_file_type(name, slot.allowed_extensions()).is_valid {
                    valid += 1;
                }
            }
        }
        label_len += format_file_size(round * 1_537).len();
        key_len += idempotency_key_for_files(&files).len();
    }

    for _ in 0..100 {
        default_dashboard()
            .validate()
            .expect("built-in dashboard should validate");
    }

    let elapsed_ms = start.elapsed().as_millis();
    println!("benchmark_elapsed_ms={elapsed_ms}");
    println!("benchmark_valid_names={valid} label_len={label_len} key_len={key_len}");

    assert_eq!(valid, 4_000);
    assert!(elapsed_ms < 5_000, "smoke benchmark should stay bounded");
}
