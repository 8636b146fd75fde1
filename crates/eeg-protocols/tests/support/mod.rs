#![allow(dead_code)]

pub mod fake_board;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use eeg_protocols::board::StreamSettings;

pub fn unique_temp_dir(label: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "eeg-protocols-it-{}-{}-{}",
        label,
        std::process::id(),
        now
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn stream_settings() -> StreamSettings {
    StreamSettings {
        ring_buffer_size: 450_000,
        streamer_params: "file://stream.csv:w".into(),
    }
}
