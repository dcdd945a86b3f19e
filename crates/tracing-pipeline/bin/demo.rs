//! # Tracing Pipeline Demo
//!
//! Exercises `Pipeline::export` end-to-end against a temp buffer file and a
//! throwaway HTTP collector, printing what got sent and what got buffered.
//!
//! ## Running
//!
//! ```bash
//! cargo run --bin tracing-pipeline-demo
//! ```

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use tracing_export::{Destination, Exporter};
use tracing_pipeline::{Pipeline, Span, SpanBatch};

fn main() {
    tracing_subscriber::fmt::init();

    let dir = std::env::temp_dir().join(format!("tracing-pipeline-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create demo dir");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind demo listener");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        while let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        }
    });

    let exporter = Exporter::new();
    exporter.set_destination(Destination::new(Some(format!("http://{addr}/")), None).unwrap());

    let pipeline = Pipeline::open(dir.join(".tracing-data.db"), exporter).expect("open pipeline");

    let batch = SpanBatch::new(vec![Span {
        name: "demo-span".into(),
        trace_id: [7; 16],
        span_id: [9; 8],
        attributes: vec![("demo".into(), "true".into())],
    }]);

    let ok = pipeline.export(&batch);
    println!("export returned: {ok}");
    println!(
        "record remaining in buffer after export: {}",
        pipeline.buffer().pump(None).unwrap().is_some()
    );

    let _ = std::fs::remove_dir_all(&dir);
}
