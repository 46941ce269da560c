#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

macro_rules! create_expense {
    ($app:expr, $cookie:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/expenses")
            .cookie($cookie.clone())
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let expense: Value = test::read_body_json(resp).await;
        expense
    }};
}

#[actix_web::test]
async fn test_create_then_list_returns_identical_record() {
    let app = setup_app!();
    let (user_id, cookie) = register_and_login!(app, "u@example.com");

    let created = create_expense!(
        app,
        cookie,
        json!({ "amount": 42.5, "category": "food", "date": "2024-01-01" })
    );
    assert_eq!(created["owner_id"], user_id);
    assert_eq!(created["amount"], 42.5);
    assert_eq!(created["category"], "food");
    assert_eq!(created["date"], "2024-01-01");
    assert_eq!(created["description"], "");
    assert!(!created["id"].as_str().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri("/api/expenses")
        .cookie(cookie.clone())
        .to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, vec![created.clone()]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/expenses/{}", created["id"].as_str().unwrap()))
        .cookie(cookie)
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn test_delete_by_another_user_is_not_found() {
    let app = setup_app!();
    let (_, owner) = register_and_login!(app, "owner@example.com");
    let (_, intruder) = register_and_login!(app, "intruder@example.com");

    let created = create_expense!(
        app,
        owner,
        json!({ "amount": 42.5, "category": "food", "date": "2024-01-01" })
    );
    let uri = format!("/api/expenses/{}", created["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(intruder.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri(&uri).cookie(intruder.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(intruder)
        .set_json(json!({ "amount": 0 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    // Untouched for the owner
    let req = test::TestRequest::get().uri(&uri).cookie(owner.clone()).to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    let req = test::TestRequest::delete().uri(&uri).cookie(owner.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], created["id"]);

    let req = test::TestRequest::delete().uri(&uri).cookie(owner).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_users_only_list_their_own_records() {
    let app = setup_app!();
    let (alice_id, alice) = register_and_login!(app, "alice@example.com");
    let (bob_id, bob) = register_and_login!(app, "bob@example.com");

    create_expense!(app, alice, json!({ "amount": 1, "category": "a", "date": "2024-01-01" }));
    create_expense!(app, alice, json!({ "amount": 2, "category": "a", "date": "2024-01-02" }));
    create_expense!(app, bob, json!({ "amount": 3, "category": "b", "date": "2024-01-03" }));

    let req = test::TestRequest::get().uri("/api/expenses").cookie(alice).to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|e| e["owner_id"] == alice_id));

    let req = test::TestRequest::get().uri("/api/expenses").cookie(bob).to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["owner_id"], bob_id);
}

#[actix_web::test]
async fn test_owner_cannot_be_set_from_the_body() {
    let app = setup_app!();
    let (user_id, cookie) = register_and_login!(app, "spoof@example.com");

    let created = create_expense!(
        app,
        cookie,
        json!({
            "amount": 5,
            "category": "food",
            "date": "2024-01-01",
            "owner_id": "someone-else"
        })
    );
    assert_eq!(created["owner_id"], user_id);
}

#[actix_web::test]
async fn test_negative_amount_is_rejected_and_zero_accepted() {
    let app = setup_app!();
    let (_, cookie) = register_and_login!(app, "amounts@example.com");

    let req = test::TestRequest::post()
        .uri("/api/expenses")
        .cookie(cookie.clone())
        .set_json(json!({ "amount": -1, "category": "food", "date": "2024-01-01" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"]["fields"][0]["field"], "amount");

    let created = create_expense!(
        app,
        cookie,
        json!({ "amount": 0, "category": "food", "date": "2024-01-01" })
    );
    assert_eq!(created["amount"], 0.0);

    let req = test::TestRequest::get().uri("/api/expenses").cookie(cookie).to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);
}

#[actix_web::test]
async fn test_missing_fields_are_reported_individually() {
    let app = setup_app!();
    let (_, cookie) = register_and_login!(app, "fields@example.com");

    let req = test::TestRequest::post()
        .uri("/api/expenses")
        .cookie(cookie)
        .set_json(json!({ "category": "", "date": "yesterday" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["details"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["amount", "category", "date"]);
}

#[actix_web::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = setup_app!();
    let (_, cookie) = register_and_login!(app, "malformed@example.com");

    let req = test::TestRequest::post()
        .uri("/api/expenses")
        .cookie(cookie)
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Validation error"));
}

#[actix_web::test]
async fn test_update_applies_partial_changes() {
    let app = setup_app!();
    let (_, cookie) = register_and_login!(app, "update@example.com");

    let created = create_expense!(
        app,
        cookie,
        json!({ "amount": 10, "category": "food", "date": "2024-01-01", "description": "lunch" })
    );
    let uri = format!("/api/expenses/{}", created["id"].as_str().unwrap());

    let req = test::TestRequest::patch()
        .uri(&uri)
        .cookie(cookie.clone())
        .set_json(json!({ "amount": 12.5, "date": "2024-01-02" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["amount"], 12.5);
    assert_eq!(updated["date"], "2024-01-02");
    assert_eq!(updated["category"], "food");
    assert_eq!(updated["description"], "lunch");

    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(cookie.clone())
        .set_json(json!({ "amount": -3 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/expenses/does-not-exist")
        .cookie(cookie)
        .set_json(json!({ "amount": 3 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_list_is_newest_first_and_filterable() {
    let app = setup_app!();
    let (_, cookie) = register_and_login!(app, "history@example.com");

    for (date, category) in [
        ("2024-01-15", "food"),
        ("2024-03-01", "rent"),
        ("2024-02-10", "food"),
    ] {
        create_expense!(app, cookie, json!({ "amount": 1, "category": category, "date": date }));
    }

    let req = test::TestRequest::get()
        .uri("/api/expenses")
        .cookie(cookie.clone())
        .to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    let dates: Vec<&str> = listed.iter().map(|e| e["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2024-03-01", "2024-02-10", "2024-01-15"]);

    let req = test::TestRequest::get()
        .uri("/api/expenses?category=food&from=2024-02-01")
        .cookie(cookie.clone())
        .to_request();
    let listed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["date"], "2024-02-10");

    let req = test::TestRequest::get()
        .uri("/api/expenses?from=not-a-date")
        .cookie(cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_summary_totals_current_user_only() {
    let app = setup_app!();
    let (_, alice) = register_and_login!(app, "sum-a@example.com");
    let (_, bob) = register_and_login!(app, "sum-b@example.com");

    create_expense!(app, alice, json!({ "amount": 10, "category": "food", "date": "2024-01-01" }));
    create_expense!(
        app,
        alice,
        json!({ "amount": "2.5", "category": "food", "date": "2024-01-02" })
    );
    create_expense!(app, alice, json!({ "amount": 100, "category": "rent", "date": "2024-01-03" }));
    create_expense!(app, bob, json!({ "amount": 999, "category": "food", "date": "2024-01-03" }));

    let req = test::TestRequest::get()
        .uri("/api/expenses/summary")
        .cookie(alice)
        .to_request();
    let summary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["total"], 112.5);
    assert_eq!(summary["by_category"]["food"], 12.5);
    assert_eq!(summary["by_category"]["rent"], 100.0);
}
