//! Integration tests for the Sözlük HTTP API.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::{release, setup_test_server, TestApp, ADMIN_KEY, API_KEY};

const VERSION: u64 = 1_700_000_000_000;

fn badge_json(slug: &str, requirement: Value) -> Value {
    json!({
        "slug": slug,
        "name": { "en": "First word", "tr": "İlk kelime" },
        "description": { "en": "Add a word", "tr": "Bir kelime ekle" },
        "icon": format!("/badges/{}.svg", slug),
        "requirement": requirement,
        "category": "contributions"
    })
}

async fn synced_app(names: &[&str]) -> TestApp {
    let app = setup_test_server();
    release(&app.source, VERSION, names);
    let response = app
        .server
        .post("/api/admin/sync")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    app
}

#[tokio::test]
async fn test_word_lookup_requires_api_key() {
    let app = synced_app(&["ahlak"]).await;

    let missing = app.server.get("/api/v1/word/ahlak").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = missing.json();
    assert_eq!(body["error"], "Unauthorized");

    let wrong = app
        .server
        .get("/api/v1/word/ahlak")
        .add_header("x-api-key", "nope")
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let ok = app
        .server
        .get("/api/v1/word/ahlak")
        .add_header("x-api-key", API_KEY)
        .await;
    assert_eq!(ok.status_code(), StatusCode::OK);
    let word: Value = ok.json();
    assert_eq!(word["name"], "ahlak");
    assert_eq!(word["meanings"][0]["meaning"], "ahlak anlamı");
}

#[tokio::test]
async fn test_word_lookup_folds_case_and_reports_unknown_words() {
    let app = synced_app(&["ağaç", "İstanbul"]).await;

    let folded = app
        .server
        .get("/api/v1/word/AGAC")
        .add_header("x-api-key", API_KEY)
        .await;
    assert_eq!(folded.status_code(), StatusCode::OK);
    assert_eq!(folded.json::<Value>()["name"], "ağaç");

    let encoded = app
        .server
        .get("/api/v1/word/%C4%B0stanbul")
        .add_header("x-api-key", API_KEY)
        .await;
    assert_eq!(encoded.status_code(), StatusCode::OK);
    assert_eq!(encoded.json::<Value>()["name"], "İstanbul");

    let unknown = app
        .server
        .get("/api/v1/word/yokkelime")
        .add_header("x-api-key", API_KEY)
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_api_allows_any_origin() {
    let app = setup_test_server();

    let preflight = app
        .server
        .method(Method::OPTIONS, "/api/v1/word/ahlak")
        .await;
    assert_eq!(preflight.status_code(), StatusCode::NO_CONTENT);
    preflight.assert_header("access-control-allow-origin", "*");
    assert!(preflight.contains_header("access-control-allow-methods"));

    let rejected = app
        .server
        .get("/api/v1/word/ahlak")
        .add_header("origin", "https://example.com")
        .await;
    assert_eq!(rejected.status_code(), StatusCode::UNAUTHORIZED);
    rejected.assert_header("access-control-allow-origin", "*");
    rejected.assert_header("x-content-type-options", "nosniff");
}

#[tokio::test]
async fn test_admin_routes_reject_foreign_origins() {
    let app = setup_test_server();
    let response = app
        .server
        .get("/api/admin/badges")
        .add_header("x-admin-key", ADMIN_KEY)
        .add_header("origin", "http://example.com:3000")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(!response.contains_header("access-control-allow-origin"));
}

#[tokio::test]
async fn test_autocomplete_endpoint() {
    let app = synced_app(&["kitap", "kitaplık", "kitapçı", "kilim", "akit"]).await;

    let short = app
        .server
        .get("/api/v1/autocomplete")
        .add_query_param("q", "k")
        .add_header("x-api-key", API_KEY)
        .await;
    assert_eq!(short.json::<Vec<String>>(), Vec::<String>::new());

    let limited = app
        .server
        .get("/api/v1/autocomplete")
        .add_query_param("q", "kit")
        .add_query_param("limit", "2")
        .add_header("x-api-key", API_KEY)
        .await;
    assert_eq!(limited.status_code(), StatusCode::OK);
    assert_eq!(limited.json::<Vec<String>>(), vec!["kitap", "kitapçı"]);

    let fallback = app
        .server
        .get("/api/v1/autocomplete")
        .add_query_param("q", "kit")
        .add_header("x-api-key", API_KEY)
        .await;
    assert_eq!(
        fallback.json::<Vec<String>>(),
        vec!["kitap", "kitapçı", "kitaplık", "akit"]
    );
}

#[tokio::test]
async fn test_admin_routes_require_admin_key() {
    let app = setup_test_server();

    let missing = app.server.get("/api/admin/badges").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

    let public_key = app
        .server
        .post("/api/admin/sync")
        .add_header("x-admin-key", API_KEY)
        .await;
    assert_eq!(public_key.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_badge_lifecycle() {
    let app = setup_test_server();
    let server = &app.server;
    let badge = badge_json("first-word", json!({ "type": "count_word", "value": 1 }));

    let created = server
        .post("/api/admin/badges")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&badge)
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);

    let duplicate = server
        .post("/api/admin/badges")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&badge)
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
    assert!(duplicate.json::<Value>()["error"].is_string());

    let updated = server
        .put("/api/admin/badges/first-word")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&json!({ "icon": "/badges/star.svg", "slug": "ignored" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let updated: Value = updated.json();
    assert_eq!(updated["slug"], "first-word");
    assert_eq!(updated["icon"], "/badges/star.svg");

    let missing = server
        .put("/api/admin/badges/ghost")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&json!({ "icon": "/x.svg" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    let listed = server
        .get("/api/admin/badges")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(listed.json::<Vec<Value>>().len(), 1);

    let deleted = server
        .delete("/api/admin/badges/first-word")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    let again = server
        .delete("/api/admin/badges/first-word")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_assign_and_revoke() {
    let app = setup_test_server();
    let server = &app.server;
    let created = server
        .post("/api/admin/badges")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&badge_json("editor", json!({ "type": "min_points", "value": 1000 })))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);

    let assigned = server
        .post("/api/admin/badges/editor/users/user-7")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(assigned.status_code(), StatusCode::CREATED);
    assert_eq!(assigned.json::<Value>()["source"], "manual");

    let duplicate = server
        .post("/api/admin/badges/editor/users/user-7")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    let unknown = server
        .post("/api/admin/badges/ghost/users/user-7")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let profile = server
        .get("/api/users/user-7/badges")
        .add_header("x-api-key", API_KEY)
        .await;
    let held: Vec<Value> = profile.json();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0]["badge_slug"], "editor");

    let revoked = server
        .delete("/api/admin/badges/editor/users/user-7")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(revoked.status_code(), StatusCode::OK);
    let not_held = server
        .delete("/api/admin/badges/editor/users/user-7")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(not_held.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contribution_awards_points_once() {
    let app = setup_test_server();
    let server = &app.server;
    let created = server
        .post("/api/admin/badges")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&badge_json("first-word", json!({ "type": "count_word", "value": 1 })))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);

    let event = json!({ "id": "approval-1", "user_id": "u1", "action": "CREATE_WORD" });
    let first = server
        .post("/api/admin/contributions")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&event)
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let first: Value = first.json();
    assert_eq!(first["points_awarded"], 10);
    assert_eq!(first["new_badges"], json!(["first-word"]));

    let replay: Value = server
        .post("/api/admin/contributions")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&event)
        .await
        .json();
    assert_eq!(replay["replayed"], true);
    assert_eq!(replay["points_awarded"], 0);

    let stats: Value = server
        .get("/api/users/u1/stats")
        .add_header("x-api-key", API_KEY)
        .await
        .json();
    assert_eq!(stats["points"], 10);
    assert_eq!(stats["words"], 1);

    let blank = server
        .post("/api/admin/contributions")
        .add_header("x-admin-key", ADMIN_KEY)
        .json(&json!({ "id": " ", "user_id": "u1", "action": "CREATE_MEANING" }))
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sync_endpoints() {
    let app = setup_test_server();
    let server = &app.server;

    let idle: Value = server
        .get("/api/admin/sync/status")
        .add_header("x-admin-key", ADMIN_KEY)
        .await
        .json();
    assert_eq!(idle["state"], "idle");

    let no_manifest = server
        .post("/api/admin/sync")
        .add_header("x-admin-key", ADMIN_KEY)
        .await;
    assert_eq!(no_manifest.status_code(), StatusCode::BAD_GATEWAY);

    release(&app.source, VERSION, &["elma", "elmas"]);
    let checked: Value = server
        .get("/api/admin/sync/status")
        .add_query_param("refresh", "true")
        .add_header("x-admin-key", ADMIN_KEY)
        .await
        .json();
    assert_eq!(checked["state"], "not-downloaded");

    let synced: Value = server
        .post("/api/admin/sync")
        .add_header("x-admin-key", ADMIN_KEY)
        .await
        .json();
    assert_eq!(synced, json!({ "state": "up-to-date", "version": VERSION }));
    assert_eq!(
        app.state.db.versions.local_version().expect("version"),
        Some(VERSION)
    );

    let deleted: Value = server
        .delete("/api/admin/sync")
        .add_header("x-admin-key", ADMIN_KEY)
        .await
        .json();
    assert_eq!(deleted["state"], "not-downloaded");
    let gone = server
        .get("/api/v1/word/elma")
        .add_header("x-api-key", API_KEY)
        .await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
}
