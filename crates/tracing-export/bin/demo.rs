//! # Tracing Export Demo
//!
//! Starts a throwaway TCP listener that accepts one request and replies
//! `200 OK`, points an `Exporter` at it, and sends a single payload.
//!
//! ## Running
//!
//! ```bash
//! cargo run --bin tracing-export-demo
//! ```

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use tracing_export::{Destination, Exporter};

fn main() {
    tracing_subscriber::fmt::init();

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind demo listener");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        }
    });

    let exporter = Exporter::new();
    let url = format!("http://{addr}/v1/traces");
    exporter.set_destination(Destination::new(Some(url.clone()), None).expect("valid destination"));

    println!("sending payload to {url}");
    let outcome = exporter.send(b"demo-payload", "application/x-protobuf");
    println!("outcome: {outcome:?}");
}
