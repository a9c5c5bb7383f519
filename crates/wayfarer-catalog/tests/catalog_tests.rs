//! End-to-end catalog behaviour on the file-backed stores.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;
use wayfarer_catalog::{AttractionFilter, Catalog, CatalogError};
use wayfarer_store::{ArrayFileStore, DirectoryStore};
use wayfarer_types::{Attraction, AttractionId, Route, RouteId};

const BASE_URL: &str = "http://127.0.0.1:5000";

type FileCatalog = Catalog<DirectoryStore<Attraction>, ArrayFileStore<Route>>;

fn catalog(root: &Path) -> FileCatalog {
    Catalog::new(
        DirectoryStore::new(root.join("attractions")),
        ArrayFileStore::new(root.join("routes.json")),
    )
}

fn create(catalog: &FileCatalog, body: Value) -> Attraction {
    catalog
        .create_attraction(serde_json::from_value(body).unwrap())
        .unwrap()
}

#[test]
fn stored_document_matches_submission() {
    let tmp = TempDir::new().unwrap();
    let catalog = catalog(tmp.path());
    let submitted = json!({
        "name": "豫园",
        "name_en": "Yu Garden",
        "description": "江南古典园林 ![湖心亭](pavilion.jpg)",
        "area": "黄浦区",
        "theme": ["古典园林"],
        "location": {"latitude": 31.2272, "longitude": 121.4921},
        "image_url": "cover.jpg",
        "opening_hours": "09:00-16:30"
    });
    let created = create(&catalog, submitted.clone());

    let path = tmp
        .path()
        .join("attractions")
        .join(&created.dir_name)
        .join("data.json");
    let mut on_disk: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
    let on_disk = on_disk.as_object_mut().unwrap();
    assert_eq!(on_disk.remove("id"), Some(json!(created.id)));
    assert_eq!(on_disk.remove("dir_name"), Some(json!("豫园")));
    assert_eq!(Value::Object(on_disk.clone()), submitted);

    let read = catalog.get_attraction(created.id, BASE_URL).unwrap();
    assert_eq!(
        read.description.as_deref(),
        Some("江南古典园林 ![湖心亭](http://127.0.0.1:5000/static/attractions/豫园/pavilion.jpg)")
    );
}

#[test]
fn listing_survives_a_corrupt_unit() {
    let tmp = TempDir::new().unwrap();
    let catalog = catalog(tmp.path());
    create(&catalog, json!({"name": "The Bund", "area": "黄浦区"}));
    create(&catalog, json!({"name": "Jing'an Temple", "area": "静安区"}));

    let broken = tmp.path().join("attractions").join("broken");
    fs::create_dir(&broken).unwrap();
    fs::write(broken.join("data.json"), "{\"id\": ").unwrap();

    let all = catalog
        .list_attractions(&AttractionFilter::default(), BASE_URL)
        .unwrap();
    assert_eq!(all.len(), 2);

    let filter = AttractionFilter {
        area: Some(String::from("静安区")),
        ..AttractionFilter::default()
    };
    let jingan = catalog.list_attractions(&filter, BASE_URL).unwrap();
    assert_eq!(jingan.len(), 1);
    assert_eq!(jingan[0].dir_name, "jing-an-temple");
}

#[test]
fn slug_directory_left_without_document_is_skipped_over() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("attractions").join("the-bund")).unwrap();
    let catalog = catalog(tmp.path());

    let created = create(&catalog, json!({"name": "The Bund"}));
    assert_eq!(created.dir_name, "the-bund-1");
}

#[test]
fn upload_then_delete_removes_the_unit() {
    let tmp = TempDir::new().unwrap();
    let catalog = catalog(tmp.path());
    let created = create(&catalog, json!({"name": "Bund"}));

    let (_, name) = catalog
        .store_attraction_asset(created.id, "night.jpg", b"jpeg")
        .unwrap();
    assert_eq!(name, "night.jpg");
    assert!(tmp.path().join("attractions/bund/night.jpg").is_file());

    catalog.delete_attraction(created.id).unwrap();
    assert!(!tmp.path().join("attractions/bund").exists());
    assert!(matches!(
        catalog.get_attraction(created.id, BASE_URL),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn routes_round_trip_through_the_array_file() {
    let tmp = TempDir::new().unwrap();
    let catalog = catalog(tmp.path());
    let bund = create(&catalog, json!({"name": "Bund"}));
    let garden = create(&catalog, json!({"name": "Garden"}));

    let route = catalog
        .create_route(
            serde_json::from_value(json!({
                "name": "Old town",
                "attraction_ids": [garden.id, bund.id, 77],
                "duration": "half day"
            }))
            .unwrap(),
        )
        .unwrap();

    let listed = catalog.list_routes().unwrap();
    assert_eq!(listed.len(), 1);

    let view = serde_json::to_value(catalog.get_route(route.id, BASE_URL).unwrap()).unwrap();
    assert_eq!(view["duration"], "half day");
    assert_eq!(view["attraction_ids"], json!([2, 1, 77]));
    assert_eq!(view["attractions"][0]["name"], "Garden");
    assert_eq!(view["attractions"].as_array().unwrap().len(), 2);

    // The derived list never reaches the file.
    let raw: Value =
        serde_json::from_slice(&fs::read(tmp.path().join("routes.json")).unwrap()).unwrap();
    assert!(raw[0].get("attractions").is_none());

    let patch = serde_json::from_value(json!({"description": "Morning walk"})).unwrap();
    let updated = catalog.update_route(route.id, patch).unwrap();
    assert_eq!(updated.description.as_deref(), Some("Morning walk"));

    catalog.delete_route(route.id).unwrap();
    assert!(catalog.list_routes().unwrap().is_empty());
    assert!(matches!(
        catalog.delete_route(route.id),
        Err(CatalogError::NotFound(_))
    ));
}

#[test]
fn empty_update_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let catalog = catalog(tmp.path());
    let bund = create(&catalog, json!({"name": "Bund"}));

    let patch = serde_json::from_value(json!({})).unwrap();
    assert!(matches!(
        catalog.update_attraction(bund.id, patch),
        Err(CatalogError::InvalidInput(_))
    ));
    assert!(matches!(
        catalog.plan_route(&[AttractionId::new(1)], BASE_URL),
        Err(CatalogError::InvalidInput(_))
    ));
}

#[test]
fn deleted_attraction_id_is_not_reissued_after_restart() {
    let tmp = TempDir::new().unwrap();
    let a = create(&catalog(tmp.path()), json!({"name": "A"}));
    let b = create(&catalog(tmp.path()), json!({"name": "B"}));
    catalog(tmp.path()).delete_attraction(b.id).unwrap();

    let c = create(&catalog(tmp.path()), json!({"name": "C"}));
    assert_eq!(a.id, AttractionId::new(1));
    assert_eq!(c.id, AttractionId::new(3));
}

#[test]
fn route_does_not_pick_up_an_attraction_created_after_a_delete() {
    let tmp = TempDir::new().unwrap();
    let catalog = catalog(tmp.path());
    let a = create(&catalog, json!({"name": "A"}));
    let b = create(&catalog, json!({"name": "B"}));
    let draft = json!({"name": "Pair", "attraction_ids": [a.id, b.id]});
    let route = catalog
        .create_route(serde_json::from_value(draft).unwrap())
        .unwrap();

    catalog.delete_attraction(b.id).unwrap();
    let c = create(&catalog, json!({"name": "C"}));
    assert_ne!(c.id, b.id);

    let view = catalog.get_route(route.id, BASE_URL).unwrap();
    let names: Vec<&str> = view.attractions.iter().map(|x| x.name.as_str()).collect();
    assert_eq!(names, vec!["A"]);
    assert_eq!(view.route.attraction_ids, vec![a.id, b.id]);
}

#[test]
fn routes_are_listed_in_file_order() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("routes.json"),
        r#"[{"id": 3, "name": "featured"}, {"id": 1, "name": "old"}]"#,
    )
    .unwrap();
    let catalog = catalog(tmp.path());

    let names: Vec<String> = catalog.list_routes().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec![String::from("featured"), String::from("old")]);

    // A new route goes after the curated ones, above every stored id.
    let added = catalog
        .create_route(serde_json::from_value(json!({"name": "new"})).unwrap())
        .unwrap();
    assert_eq!(added.id, RouteId::new(4));
    let last = catalog.list_routes().unwrap().pop().unwrap();
    assert_eq!(last.name, "new");
}

#[test]
fn hand_edited_attractions_key_is_not_served_twice() {
    let tmp = TempDir::new().unwrap();
    let catalog = catalog(tmp.path());
    let bund = create(&catalog, json!({"name": "Bund"}));
    fs::write(
        tmp.path().join("routes.json"),
        json!([{
            "id": 1,
            "name": "Edited",
            "attraction_ids": [bund.id],
            "attractions": [{"name": "stale"}]
        }])
        .to_string(),
    )
    .unwrap();

    let view = catalog.get_route(RouteId::new(1), BASE_URL).unwrap();
    let body = serde_json::to_string(&view).unwrap();
    assert_eq!(body.matches("\"attractions\"").count(), 1);
    assert!(!body.contains("stale"));
    assert!(!catalog.list_routes().unwrap()[0].extra.contains_key("attractions"));
}
