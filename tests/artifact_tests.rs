use droid_explorer::instrument::client::PathEvent;
use droid_explorer::instrument::paths::{PathStore, is_relevant};

// =========================================================================
// Path relevance
// =========================================================================

#[test]
fn forensic_locations_are_relevant() {
    assert!(is_relevant("/data/data/com.app/databases/msgstore.db"));
    assert!(is_relevant("/sdcard/Download/report.pdf"));
    assert!(is_relevant("/storage/emulated/0/DCIM/Camera/img.jpg"));
    assert!(is_relevant("/tmp/anything.sqlite"), "Database suffix alone is enough");
}

#[test]
fn runtime_noise_is_filtered() {
    assert!(!is_relevant("/system/framework/framework.jar"));
    assert!(!is_relevant("/proc/self/maps"));
    assert!(!is_relevant("/dev/null"));
    assert!(!is_relevant("/apex/com.android.runtime/bin/linker64"));
}

// =========================================================================
// Path store bookkeeping
// =========================================================================

#[test]
fn duplicates_collapse_but_keep_their_first_context() {
    let mut store = PathStore::new();
    store.record(&PathEvent {
        path: "/data/data/com.app/files/cache.db".to_string(),
        context: "open".to_string(),
    });
    store.record(&PathEvent {
        path: "/data/data/com.app/files/cache.db".to_string(),
        context: "write".to_string(),
    });

    assert_eq!(store.unique_count(), 1);
    let records = store.sorted_records();
    assert_eq!(records[0].count, 2, "Both sightings are counted");
    assert_eq!(records[0].context, "open", "First context wins");
}

#[test]
fn csv_header_and_quoting_are_stable() {
    let mut store = PathStore::new();
    store.record_bare("/sdcard/weird,name.db", "scan");

    let csv = store.to_csv();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Path,Context,Count,Timestamp"));
    let row = lines.next().unwrap();
    assert!(
        row.starts_with("\"/sdcard/weird,name.db\""),
        "Comma-bearing paths are quoted: {}",
        row
    );
}

#[test]
fn irrelevant_paths_never_enter_the_store() {
    let mut store = PathStore::new();
    store.record_bare("/proc/self/status", "open");
    assert_eq!(store.unique_count(), 0, "Runtime noise is dropped at the door");
}
