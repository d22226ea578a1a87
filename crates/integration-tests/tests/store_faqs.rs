//! Store FAQs, their translations and isolation between tenants.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use faqdesk_integration_tests::TestApp;
use serde_json::json;

struct Tenants {
    app: TestApp,
    admin: String,
    alice: String,
    alice_store: i64,
    bob: String,
    bob_store: i64,
}

async fn tenants() -> Tenants {
    let app = TestApp::new();
    let (_, admin) = app.admin("root@example.com").await;
    app.category(&admin, "billing").await;
    let (alice, alice_store) = app.merchant("alice@example.com", "Alice Goods").await;
    let (bob, bob_store) = app.merchant("bob@example.com", "Bob Supplies").await;
    Tenants {
        app,
        admin,
        alice,
        alice_store,
        bob,
        bob_store,
    }
}

async fn store_faq(t: &Tenants, store: i64, token: &str) -> i64 {
    let created = t
        .app
        .post(
            &format!("/api/v1/stores/{store}/faqs"),
            Some(token),
            json!({
                "category": "billing",
                "language": "en",
                "question": "Do you ship abroad?",
                "answer": "Yes, worldwide."
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert_eq!(created.body["faq"]["is_global"], false);
    assert_eq!(created.body["faq"]["store_id"], store);
    created.body["faq"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_merchant_manages_own_store_faqs() {
    let t = tenants().await;
    let id = store_faq(&t, t.alice_store, &t.alice).await;
    let faq_uri = format!("/api/v1/stores/{}/faqs/{id}", t.alice_store);

    let list = t
        .app
        .get(&format!("/api/v1/stores/{}/faqs", t.alice_store))
        .await;
    assert_eq!(list.body["faqs"].as_array().unwrap().len(), 1);

    let added = t
        .app
        .post(
            &format!("{faq_uri}/translations"),
            Some(&t.alice),
            json!({ "language": "de", "question": "Versand ins Ausland?", "answer": "Ja." }),
        )
        .await;
    assert_eq!(added.status, StatusCode::CREATED);

    let edited = t
        .app
        .put(
            &format!("{faq_uri}/translations/de"),
            Some(&t.alice),
            json!({ "question": "Versand weltweit?", "answer": "Ja, weltweit." }),
        )
        .await;
    assert_eq!(edited.status, StatusCode::OK, "{:?}", edited.body);
    assert_eq!(edited.body["translation"]["question"], "Versand weltweit?");
    assert_eq!(edited.body["translation"]["language"], "de");

    let deleted = t.app.delete(&faq_uri, Some(&t.alice)).await;
    assert_eq!(deleted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_store_faqs_stay_out_of_global_listing() {
    let t = tenants().await;
    store_faq(&t, t.alice_store, &t.alice).await;

    let global = t.app.get("/api/v1/faq-categories/billing/faqs").await;

    assert!(global.body["faqs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_other_merchant_cannot_create_in_store() {
    let t = tenants().await;

    let resp = t
        .app
        .post(
            &format!("/api/v1/stores/{}/faqs", t.alice_store),
            Some(&t.bob),
            json!({
                "category": "billing",
                "language": "en",
                "question": "Mine now?",
                "answer": "No."
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_faq_through_own_store() {
    let t = tenants().await;
    let id = store_faq(&t, t.alice_store, &t.alice).await;
    let through_bob = format!("/api/v1/stores/{}/faqs/{id}", t.bob_store);

    let read = t.app.get(&through_bob).await;
    let write = t
        .app
        .put(&through_bob, Some(&t.bob), json!({ "category": "billing" }))
        .await;
    let delete = t.app.delete(&through_bob, Some(&t.bob)).await;
    let translate = t
        .app
        .post(
            &format!("{through_bob}/translations"),
            Some(&t.bob),
            json!({ "language": "es", "question": "¿Qué?", "answer": "Nada." }),
        )
        .await;

    assert_eq!(read.status, StatusCode::NOT_FOUND);
    assert_eq!(write.status, StatusCode::UNAUTHORIZED);
    assert_eq!(delete.status, StatusCode::UNAUTHORIZED);
    assert_eq!(translate.status, StatusCode::UNAUTHORIZED);

    // Even an admin cannot act on a FAQ through the wrong store.
    let admin_write = t
        .app
        .delete(&through_bob, Some(&t.admin))
        .await;
    assert_eq!(admin_write.status, StatusCode::UNAUTHORIZED);

    let still_there = t
        .app
        .get(&format!("/api/v1/stores/{}/faqs/{id}", t.alice_store))
        .await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_global_faq_is_not_reachable_through_a_store() {
    let t = tenants().await;
    let created = t
        .app
        .post(
            "/api/v1/faq-categories/billing/faqs",
            Some(&t.admin),
            json!({ "language": "en", "question": "Global?", "answer": "Yes." }),
        )
        .await;
    let id = created.body["faq"]["id"].as_i64().unwrap();

    let resp = t
        .app
        .get(&format!("/api/v1/stores/{}/faqs/{id}", t.alice_store))
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_promoting_to_global_needs_admin() {
    let t = tenants().await;
    let id = store_faq(&t, t.alice_store, &t.alice).await;
    let faq_uri = format!("/api/v1/stores/{}/faqs/{id}", t.alice_store);

    let by_merchant = t
        .app
        .put(&faq_uri, Some(&t.alice), json!({ "is_global": true }))
        .await;
    assert_eq!(by_merchant.status, StatusCode::UNAUTHORIZED);

    let by_admin = t
        .app
        .put(&faq_uri, Some(&t.admin), json!({ "is_global": true }))
        .await;
    assert_eq!(by_admin.status, StatusCode::OK, "{:?}", by_admin.body);
    assert_eq!(by_admin.body["faq"]["is_global"], true);
    assert!(by_admin.body["faq"]["store_id"].is_null());

    let global = t
        .app
        .get(&format!("/api/v1/faq-categories/billing/faqs/{id}"))
        .await;
    assert_eq!(global.status, StatusCode::OK);
}

#[tokio::test]
async fn test_merchant_cannot_move_faq_into_another_store() {
    let t = tenants().await;
    let id = store_faq(&t, t.alice_store, &t.alice).await;

    let resp = t
        .app
        .put(
            &format!("/api/v1/stores/{}/faqs/{id}", t.alice_store),
            Some(&t.alice),
            json!({ "store_id": t.bob_store }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_faq_with_unknown_category() {
    let t = tenants().await;

    let resp = t
        .app
        .post(
            &format!("/api/v1/stores/{}/faqs", t.alice_store),
            Some(&t.alice),
            json!({
                "category": "returns",
                "language": "en",
                "question": "Returns?",
                "answer": "Within 30 days."
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_store() {
    let t = tenants().await;

    assert_eq!(
        t.app.get("/api/v1/stores/9999").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        t.app.get("/api/v1/stores/9999/faqs").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_only_the_owner_renames_a_store() {
    let t = tenants().await;
    let uri = format!("/api/v1/stores/{}", t.alice_store);
    let body = json!({ "name": "Alice & Co" });

    let by_bob = t.app.put(&uri, Some(&t.bob), body.clone()).await;
    let by_admin = t.app.put(&uri, Some(&t.admin), body.clone()).await;
    let by_alice = t.app.put(&uri, Some(&t.alice), body).await;

    assert_eq!(by_bob.status, StatusCode::UNAUTHORIZED);
    assert_eq!(by_admin.status, StatusCode::UNAUTHORIZED);
    assert_eq!(by_alice.status, StatusCode::OK);
    assert_eq!(by_alice.body["store"]["name"], "Alice & Co");
}

#[tokio::test]
async fn test_store_path_must_be_numeric() {
    let t = tenants().await;

    let resp = t.app.get("/api/v1/stores/abc/faqs").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
