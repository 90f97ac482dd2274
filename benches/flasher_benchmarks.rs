//! Performance benchmarks for esp-flasher
//!
//! Plan building touches the filesystem for every selected image, and the
//! console buffer sees every byte the flashing tool prints.

use criterion::{Criterion, criterion_group, criterion_main};
use esp_flasher::models::{BaudRate, Chip, FlashRole, FlashTargets, PortSelection};
use esp_flasher::services::FlashPlanBuilder;
use esp_flasher::utils::console::ConsoleBuffer;
use std::hint::black_box;
use tempfile::TempDir;

/// Benchmark building and rendering a four-image write plan
fn benchmark_plan_building(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut targets = FlashTargets::new();
    for (role, name) in [
        (FlashRole::Bootloader, "bootloader.bin"),
        (FlashRole::PartitionTable, "partitions.bin"),
        (FlashRole::Application, "app.bin"),
        (FlashRole::FilesystemImage, "spiffs.bin"),
    ] {
        let path = temp_dir.path().join(name);
        std::fs::write(&path, [0xE9u8; 64]).unwrap();
        targets.select_file(role, path);
    }

    let builder = FlashPlanBuilder::new(
        Chip::Esp32,
        BaudRate::B921600,
        PortSelection::Named("/dev/ttyUSB0".to_string()),
    );

    c.bench_function("plan_build_write", |b| {
        b.iter(|| {
            let plan = builder.write(black_box(&targets)).unwrap();
            black_box(plan.arguments())
        })
    });
}

/// Benchmark progress-bar style output with heavy backspacing
fn benchmark_console_backspace(c: &mut Criterion) {
    let mut chunks = Vec::new();
    for percent in 0..=100 {
        chunks.push(format!("Writing at 0x{:08x}... ({} %)", 0x10000 + percent * 0x400, percent));
        chunks.push("\u{8}".repeat(40));
    }

    c.bench_function("console_progress_output", |b| {
        b.iter(|| {
            let mut console = ConsoleBuffer::new();
            for chunk in &chunks {
                console.push(black_box(chunk));
            }
            black_box(console.into_text())
        })
    });
}

criterion_group!(benches, benchmark_plan_building, benchmark_console_backspace);
criterion_main!(benches);
