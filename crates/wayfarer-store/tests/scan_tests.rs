//! Collection scans over hand-written data directories.

#![allow(clippy::unwrap_used)]

use std::fs;

use tempfile::TempDir;
use wayfarer_store::{ArrayFileStore, DOCUMENT_FILE, DirectoryStore, DocumentStore, SEQUENCE_FILE};
use wayfarer_types::{Attraction, AttractionId, Route};

fn write_unit(root: &std::path::Path, dir: &str, body: &str) {
    fs::create_dir_all(root.join(dir)).unwrap();
    fs::write(root.join(dir).join(DOCUMENT_FILE), body).unwrap();
}

#[test]
fn corrupt_unit_is_skipped_in_listing() {
    let tmp = TempDir::new().unwrap();
    write_unit(tmp.path(), "yu-garden", r#"{"id": 1, "name": "豫园", "theme": ["古典园林"]}"#);
    write_unit(tmp.path(), "broken", "{ this is not json");
    write_unit(tmp.path(), "the-bund", r#"{"id": 2, "name": "外滩", "area": "黄浦区"}"#);
    fs::create_dir(tmp.path().join("empty")).unwrap();
    fs::write(tmp.path().join("stray.txt"), "ignored").unwrap();

    let store: DirectoryStore<Attraction> = DirectoryStore::new(tmp.path());
    let listed = store.list().unwrap();

    let ids: Vec<AttractionId> = listed.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![AttractionId::new(2), AttractionId::new(1)]);
    let dirs: Vec<&str> = listed.iter().map(|a| a.dir_name.as_str()).collect();
    assert_eq!(dirs, vec!["the-bund", "yu-garden"]);
}

#[test]
fn unknown_fields_survive_a_rewrite() {
    let tmp = TempDir::new().unwrap();
    write_unit(
        tmp.path(),
        "yu-garden",
        r#"{"id": 1, "name": "豫园", "opening_hours": "09:00-16:30"}"#,
    );
    let store: DirectoryStore<Attraction> = DirectoryStore::new(tmp.path());

    let mut doc = store.get("yu-garden").unwrap().unwrap();
    doc.area = Some(String::from("黄浦区"));
    store.put(&doc).unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&fs::read(tmp.path().join("yu-garden").join(DOCUMENT_FILE)).unwrap())
            .unwrap();
    assert_eq!(raw["opening_hours"], "09:00-16:30");
    assert_eq!(raw["area"], "黄浦区");
}

#[test]
fn route_file_keeps_curated_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("routes.json");
    fs::write(
        &path,
        r#"[{"id": 3, "name": "featured", "attraction_ids": [1]}, {"id": 1, "name": "old"}]"#,
    )
    .unwrap();

    let store: ArrayFileStore<Route> = ArrayFileStore::new(path);
    let names: Vec<String> = store.list().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec![String::from("featured"), String::from("old")]);
}

#[test]
fn sequence_file_is_not_a_unit() {
    let tmp = TempDir::new().unwrap();
    write_unit(tmp.path(), "yu-garden", r#"{"id": 1, "name": "豫园"}"#);
    fs::write(tmp.path().join(SEQUENCE_FILE), r#"{"last_issued_id": 5}"#).unwrap();

    let store: DirectoryStore<Attraction> = DirectoryStore::new(tmp.path());
    assert_eq!(store.list().unwrap().len(), 1);
    assert_eq!(store.last_issued_id().unwrap(), 5);
}
