//! # Tracing Lifecycle Demo
//!
//! Walks through `setup -> set_destination -> shutdown` against a temp
//! charm directory and a throwaway HTTP collector, the sequence a real
//! dispatch goes through.
//!
//! ## Running
//!
//! ```bash
//! cargo run --bin tracing-lifecycle-demo
//! ```

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use tracing_lifecycle::{setup_with_environment, MapEnvironment};

fn main() {
    tracing_subscriber::fmt::init();

    let dir = std::env::temp_dir().join(format!("tracing-lifecycle-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create demo charm dir");

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind demo listener");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        while let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        }
    });

    let env = MapEnvironment::new()
        .with("JUJU_UNIT_NAME", "demo-charm/0")
        .with("JUJU_MODEL_NAME", "demo-model")
        .with("JUJU_MODEL_UUID", "00000000-0000-0000-0000-000000000000")
        .with("JUJU_CHARM_DIR", dir.to_str().unwrap());

    setup_with_environment("DemoCharm", &env).expect("setup");
    println!("lifecycle set up, buffer at {}", dir.join(".tracing-data.db").display());

    tracing_lifecycle::set_destination(Some(format!("http://{addr}/")), None).expect("set_destination");
    println!("destination set, dispatch marked observed");

    tracing_lifecycle::shutdown(|| Ok(()));
    println!("shutdown complete");

    let _ = std::fs::remove_dir_all(&dir);
}
