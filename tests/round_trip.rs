use outline::io::snapshot::{load_snapshot, save_snapshot};
use outline::{Node, Snapshot};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn read_fixture(fixture_name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(fixture_name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Could not read fixture {}: {}", fixture_name, e))
}

/// Parse a fixture, serialize it again, and assert the text is unchanged
fn assert_snapshot_round_trip(fixture_name: &str) {
    let source = read_fixture(fixture_name);
    let snapshot = Snapshot::from_json(&source).unwrap();
    let output = snapshot.to_json().unwrap();

    assert_eq!(
        output,
        source.trim_end(),
        "Round-trip failed for fixture: {}",
        fixture_name
    );
}

// ============================================================================
// Snapshot text round-trip
// ============================================================================

#[test]
fn round_trip_outline_snapshot() {
    assert_snapshot_round_trip("outline_snapshot.json");
}

#[test]
fn round_trip_through_store_is_lossless() {
    let source = read_fixture("outline_snapshot.json");
    let snapshot = Snapshot::from_json(&source).unwrap();
    let store = snapshot.clone().into_store().unwrap();

    assert_eq!(store.active_id(), Some("1-2"));
    assert_eq!(store.snapshot(), snapshot);
    assert_eq!(store.snapshot().to_json().unwrap(), source.trim_end());
}

#[test]
fn round_trip_keeps_unicode_and_whitespace() {
    let snapshot = Snapshot {
        tasks: vec![
            Node::with_id("x", "  café ☕ \n second line"),
            Node::with_id("y", ""),
        ],
        active_task_id: None,
    };
    let back = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(back, snapshot);
}

// ============================================================================
// Legacy data
// ============================================================================

#[test]
fn legacy_array_is_normalized() {
    let snapshot = Snapshot::from_json(&read_fixture("legacy_tasks.json")).unwrap();
    let store = snapshot.into_store().unwrap();

    let ids: Vec<&str> = store.flattened().iter().map(|e| e.node.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "a-1", "a-2", "b"]);

    let a1 = store.find("a-1").unwrap().node;
    assert_eq!(a1.text, "");
    assert!(!a1.completed);
    assert!(a1.children.is_empty());

    let a2 = store.find("a-2").unwrap().node;
    assert!(a2.completed);
    assert!(a2.children.is_empty());

    assert!(!store.find("b").unwrap().node.completed);
}

#[test]
fn legacy_array_supports_mutations() {
    let mut store = Snapshot::from_json(&read_fixture("legacy_tasks.json"))
        .unwrap()
        .into_store()
        .unwrap();

    assert!(store.nest("b"));
    assert!(store.move_up("a-1"));
    assert!(store.delete("a"));

    let ids: Vec<&str> = store.forest().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a-1", "a-2", "b"]);
}

// ============================================================================
// Disk
// ============================================================================

#[test]
fn fixture_survives_disk_round_trip() {
    let tmp = TempDir::new().unwrap();
    let snapshot = Snapshot::from_json(&read_fixture("outline_snapshot.json")).unwrap();

    save_snapshot(tmp.path(), &snapshot).unwrap();
    let loaded = load_snapshot(tmp.path()).unwrap().unwrap();

    assert_eq!(loaded, snapshot);
}

#[test]
fn corrupt_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("tasks.json"), "[{\"id\": ").unwrap();
    assert!(load_snapshot(tmp.path()).is_err());
}
