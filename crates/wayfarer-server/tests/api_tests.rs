//! Integration tests for the catalog API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test gets its own data directory seeded
//! with a handful of attractions and one route.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use wayfarer_server::router::build_router;
use wayfarer_server::{AppState, WayfarerConfig};

const PUBLIC_URL: &str = "http://test.local";

fn seed_attraction(root: &Path, doc: &Value) {
    let dir = root
        .join("attractions")
        .join(doc["dir_name"].as_str().unwrap());
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("data.json"), serde_json::to_vec_pretty(doc).unwrap()).unwrap();
}

fn seed(root: &Path) {
    seed_attraction(
        root,
        &json!({
            "id": 1,
            "name": "Yu Garden",
            "description": "Classical garden ![pond](pond.jpg)",
            "area": "Huangpu",
            "theme": ["garden", "history"],
            "location": {"latitude": 31.00, "longitude": 121.00},
            "image_url": "cover.jpg",
            "dir_name": "yu-garden"
        }),
    );
    seed_attraction(
        root,
        &json!({
            "id": 2,
            "name": "The Bund",
            "area": "Huangpu",
            "theme": ["skyline"],
            "location": {"latitude": 31.20, "longitude": 121.00},
            "image_url": "https://cdn.example.com/bund.jpg",
            "dir_name": "the-bund"
        }),
    );
    seed_attraction(
        root,
        &json!({
            "id": 3,
            "name": "Jing'an Temple",
            "area": "Jing'an",
            "theme": ["history", "temple"],
            "location": {"latitude": 31.10, "longitude": 121.00},
            "dir_name": "jingan-temple"
        }),
    );
    seed_attraction(
        root,
        &json!({
            "id": 4,
            "name": "City Museum",
            "area": "Jing'an",
            "theme": ["history"],
            "dir_name": "city-museum"
        }),
    );
    fs::write(
        root.join("routes.json"),
        serde_json::to_vec_pretty(&json!([
            {"id": 1, "name": "Old town", "attraction_ids": [2, 9, 1]}
        ]))
        .unwrap(),
    )
    .unwrap();
}

fn make_app(tmp: &TempDir, with_auth: bool) -> Router {
    seed(tmp.path());
    let mut config = WayfarerConfig::default();
    config.storage.data_dir = tmp.path().to_path_buf();
    config.server.public_url = Some(String::from(PUBLIC_URL));
    if with_auth {
        config.auth.username = Some(String::from("admin"));
        config.auth.password = Some(String::from("secret"));
    }
    let state = AppState::from_config(&config).unwrap();
    build_router(Arc::new(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"username": "admin", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    body["token"].as_str().unwrap().to_owned()
}

fn ids(list: &Value) -> Vec<u64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Service endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

// ---------------------------------------------------------------------------
// Attraction reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_all_attractions_by_id() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);
    let (status, body) = get(&app, "/api/attractions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn filters_combine_with_and() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);

    let (_, body) = get(&app, "/api/attractions?area=Huangpu&theme=history").await;
    assert_eq!(ids(&body), vec![1]);

    let (_, body) = get(&app, "/api/attractions?keyword=BUND").await;
    assert_eq!(ids(&body), vec![2]);

    let (_, body) = get(&app, "/api/attractions?theme=history").await;
    assert_eq!(ids(&body), vec![1, 3, 4]);

    let (_, body) = get(&app, "/api/attractions?keyword=&area=").await;
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn asset_references_become_absolute() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);

    let (status, body) = get(&app, "/api/attractions/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["image_url"],
        "http://test.local/static/attractions/yu-garden/cover.jpg"
    );
    assert_eq!(
        body["description"],
        "Classical garden ![pond](http://test.local/static/attractions/yu-garden/pond.jpg)"
    );

    let (_, body) = get(&app, "/api/attractions/2").await;
    assert_eq!(body["image_url"], "https://cdn.example.com/bund.jpg");
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);

    let (status, body) = get(&app, "/api/attractions/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert!(body["error"].is_string());

    let (status, body) = get(&app, "/api/attractions/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

// ---------------------------------------------------------------------------
// Auth and attraction writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn writes_require_a_token() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, true);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/attractions", None, &json!({"name": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"username": "admin", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_update_delete_attraction() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, true);
    let token = login(&app).await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/attractions",
            Some(&token),
            &json!({
                "name": "Shanghai Museum",
                "area": "Huangpu",
                "theme": ["museum", " museum "],
                "description": "<b>Bronzes</b><script>alert(1)</script>",
                "image_url": "front.jpg"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 5);
    assert_eq!(created["dir_name"], "shanghai-museum");
    assert_eq!(created["theme"], json!(["museum"]));
    assert_eq!(created["description"], "<b>Bronzes</b>");
    assert_eq!(
        created["image_url"],
        "http://test.local/static/attractions/shanghai-museum/front.jpg"
    );
    assert!(
        tmp.path()
            .join("attractions/shanghai-museum/data.json")
            .is_file()
    );

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            "/api/attractions/5",
            Some(&token),
            &json!({"area": "Xuhui", "image_url": null, "opening_hours": "09:00-17:00"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["area"], "Xuhui");
    assert_eq!(updated["name"], "Shanghai Museum");
    assert!(updated.get("image_url").is_none());
    assert_eq!(updated["opening_hours"], "09:00-17:00");

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/attractions/5", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Request::delete("/api/attractions/5")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert!(!tmp.path().join("attractions/shanghai-museum").exists());

    let (status, _) = get(&app, "/api/attractions/5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);
    let request = Request::post("/api/attractions")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn login_without_configured_credentials_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({"username": "admin", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Uploads and static assets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uploaded_image_is_served() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, true);
    let token = login(&app).await;

    let body = "--XBOUNDARY\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"gate photo.jpg\"\r\n\
        Content-Type: image/jpeg\r\n\
        \r\n\
        JPEGDATA\r\n\
        --XBOUNDARY--\r\n";
    let request = Request::post("/api/attractions/1/images")
        .header(CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    let (status, uploaded) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploaded["file_name"], "gatephoto.jpg");
    assert_eq!(
        uploaded["url"],
        "http://test.local/static/attractions/yu-garden/gatephoto.jpg"
    );

    let response = app
        .clone()
        .oneshot(
            Request::get("/static/attractions/yu-garden/gatephoto.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes, "JPEGDATA");
}

#[tokio::test]
async fn upload_to_unknown_attraction_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);
    let body = "--B\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"a.jpg\"\r\n\
        \r\n\
        x\r\n\
        --B--\r\n";
    let request = Request::post("/api/attractions/99/images")
        .header(CONTENT_TYPE, "multipart/form-data; boundary=B")
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn route_resolves_attractions_in_order() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);

    let (status, body) = get(&app, "/api/routes/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Old town");
    assert_eq!(body["attraction_ids"], json!([2, 9, 1]));
    assert_eq!(ids(&body["attractions"]), vec![2, 1]);
    assert_eq!(
        body["attractions"][1]["image_url"],
        "http://test.local/static/attractions/yu-garden/cover.jpg"
    );

    let (status, list) = get(&app, "/api/routes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&list), vec![1]);
    assert!(list[0].get("attractions").is_none());

    let (status, _) = get(&app, "/api/routes/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn route_crud() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/routes",
            None,
            &json!({"name": "Temples", "attraction_ids": [3]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 2);

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            "/api/routes/2",
            None,
            &json!({"attraction_ids": [3, 1]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Temples");
    assert_eq!(updated["attraction_ids"], json!([3, 1]));

    let (status, _) = send(
        &app,
        Request::delete("/api/routes/2").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = get(&app, "/api/routes").await;
    assert_eq!(ids(&list), vec![1]);
}

#[tokio::test]
async fn custom_route_orders_by_nearest_neighbor() {
    let tmp = TempDir::new().unwrap();
    let app = make_app(&tmp, false);

    let (status, plan) = send(
        &app,
        json_request(
            "POST",
            "/api/routes/custom",
            None,
            &json!({"attraction_ids": [1, 2, 3, 4, 99]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["attraction_ids"], json!([1, 3, 2]));
    assert_eq!(ids(&plan["attractions"]), vec![1, 3, 2]);
    assert_eq!(plan["legs_km"].as_array().unwrap().len(), 2);
    let total = plan["total_distance_km"].as_f64().unwrap();
    assert!((total - 22.239).abs() < 0.01, "total {total}");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/routes/custom",
            None,
            &json!({"attraction_ids": [1, 1]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
