//! Drives the restart round-trip property across process-lifetime
//! boundaries: a fresh `Lifecycle` over the same buffer file sees a clean
//! session (`observed = false`, empty `pending_ids`) but the same persisted
//! records, mirroring two separate dispatches of the same charm.

use tracing_lifecycle::{Lifecycle, MapEnvironment};

#[test]
fn fresh_lifecycle_over_an_existing_buffer_file_sees_prior_records() {
    let dir = tempfile::tempdir().unwrap();
    let env = MapEnvironment::new().with("JUJU_CHARM_DIR", dir.path().to_str().unwrap());

    {
        let lifecycle = Lifecycle::setup("MyCharm", &env).unwrap();
        lifecycle.pipeline().buffer().pump(Some((b"dispatch-1-span", "m"))).unwrap();
        lifecycle.set_destination(Some("http://example.invalid/".into()), None).unwrap();
    }

    // Simulates the next dispatch: brand new process, same charm directory.
    let lifecycle = Lifecycle::setup("MyCharm", &env).unwrap();
    let head = lifecycle.pipeline().buffer().pump(None).unwrap().unwrap();
    assert_eq!(head.payload, b"dispatch-1-span");
    assert_eq!(head.priority, 50, "prior dispatch's OBSERVED promotion survives restart");
    assert!(!lifecycle.pipeline().buffer().is_observed(), "new dispatch starts with a clean session");
}

#[test]
fn two_concurrent_lifecycles_over_the_same_file_both_see_a_clean_session() {
    let dir = tempfile::tempdir().unwrap();
    let env = MapEnvironment::new().with("JUJU_CHARM_DIR", dir.path().to_str().unwrap());

    let first = Lifecycle::setup("MyCharm", &env).unwrap();
    let second = Lifecycle::setup("MyCharm", &env).unwrap();

    first.pipeline().buffer().pump(Some((b"from-first", "m"))).unwrap();
    second.set_destination(Some("http://example.invalid/".into()), None).unwrap();

    // `second`'s mark_observed only promotes ids inserted through `second`'s
    // own pending_ids, so the record `first` inserted stays at DEFAULT.
    let head = second.pipeline().buffer().pump(None).unwrap().unwrap();
    assert_eq!(head.priority, 10);
}
