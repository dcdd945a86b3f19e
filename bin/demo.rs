//! # Tracing Store Demo
//!
//! Exercises `Buffer` against a real on-disk file: insert, promote, evict,
//! drain. Not wired into any test; run it directly to eyeball behavior.
//!
//! ## Running
//!
//! ```bash
//! cargo run --bin tracing-store-demo
//! ```

use std::env;
use std::time::Duration;

use tracing_store::{Buffer, Config};

fn main() {
    tracing_subscriber::fmt::init();

    let dir = env::temp_dir().join(format!("tracing-store-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create demo dir");
    let path = dir.join(".tracing-data.db");
    println!("buffer file: {}", path.display());

    // Small capacity so eviction is visible without generating megabytes.
    let config = Config::new(16 * 1024, Duration::from_secs(5), Duration::from_secs(3600));
    let buffer = Buffer::open(&path, config).expect("open buffer");

    for i in 0..6u32 {
        let payload = vec![i as u8; 4000];
        let head = buffer
            .pump(Some((&payload, "application/x-protobuf")))
            .expect("pump");
        println!("inserted span-batch-{i}, head={head:?}");
    }

    println!("marking this dispatch observed");
    buffer.mark_observed().expect("mark_observed");

    let mut drained = 0;
    while let Some(head) = buffer.pump(None).expect("pump") {
        println!("draining id={} priority={} bytes={}", head.id, head.priority, head.payload.len());
        buffer.remove(head.id).expect("remove");
        drained += 1;
    }
    println!("drained {drained} records");

    let _ = std::fs::remove_dir_all(&dir);
}
