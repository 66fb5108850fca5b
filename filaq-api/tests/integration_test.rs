//! Integration tests for the filaq API
//!
//! These verify the full system end-to-end against a live Postgres
//! (`DATABASE_URL`): cookie authentication, tenant isolation, the ticket
//! sequence under concurrency, FIFO calling, and the status lifecycle.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{assert_status, TestContext};
use filaq_shared::sequence;
use serde_json::json;
use std::collections::HashSet;
use uuid::Uuid;

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a timestamp: {}", value))
}

#[tokio::test]
async fn test_signup_login_me_flow() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("owner-{}@example.com", Uuid::new_v4());

    // Signup creates company + user.
    let response = ctx
        .send(
            "POST",
            "/auth/signup",
            Some(json!({
                "companyName": "Flow Barbershop",
                "email": email.as_str(),
                "password": "a-long-enough-password"
            })),
            false,
        )
        .await;
    let signup = assert_status(response, StatusCode::CREATED).await;
    let company_id = signup["companyId"].as_str().unwrap().to_string();

    // Login sets the session cookie.
    let response = ctx
        .send(
            "POST",
            "/auth/login",
            Some(json!({ "email": email.as_str(), "password": "a-long-enough-password" })),
            false,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("login must set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("auth-token="));
    assert!(set_cookie.contains("HttpOnly"));

    // The cookie authenticates /auth/me.
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header("cookie", cookie_pair)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::Service::call(&mut ctx.app.clone(), request)
        .await
        .unwrap();
    let me = assert_status(response, StatusCode::OK).await;
    assert_eq!(me["email"], email.as_str());
    assert_eq!(me["companyId"], company_id.as_str());

    // Wrong password is a 401.
    let response = ctx
        .send(
            "POST",
            "/auth/login",
            Some(json!({ "email": email.as_str(), "password": "wrong-password-here" })),
            false,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    sqlx::query("DELETE FROM companies WHERE id = $1::uuid")
        .bind(company_id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let ctx = TestContext::new().await.unwrap();

    let body = json!({
        "companyName": "First Company",
        "email": ctx.user.email.as_str(),
        "password": "a-long-enough-password"
    });

    let response = ctx.send("POST", "/auth/signup", Some(body), false).await;
    let error = assert_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(error["error"], "conflict");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_staff_routes_require_cookie() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.send("GET", "/queues", None, false).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/queues")
        .header("cookie", "auth-token=garbage")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::Service::call(&mut ctx.app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_queue_and_prefix_scope() {
    let ctx = TestContext::new().await.unwrap();

    // Prefix is upper-cased on creation.
    let response = ctx
        .send(
            "POST",
            "/queues",
            Some(json!({ "name": "Front desk", "prefix": "a" })),
            true,
        )
        .await;
    let queue = assert_status(response, StatusCode::CREATED).await;
    assert_eq!(queue["prefix"], "A");
    assert_eq!(queue["currentNumber"], 0);
    assert_eq!(queue["waitingCount"], 0);

    // Same prefix in the same company conflicts, whatever the case.
    let response = ctx
        .send(
            "POST",
            "/queues",
            Some(json!({ "name": "Another desk", "prefix": "A" })),
            true,
        )
        .await;
    let error = assert_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(error["error"], "conflict");

    // Another company may reuse the prefix.
    let other = TestContext::new().await.unwrap();
    let response = other
        .send(
            "POST",
            "/queues",
            Some(json!({ "name": "Front desk", "prefix": "A" })),
            true,
        )
        .await;
    assert_status(response, StatusCode::CREATED).await;

    other.cleanup().await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_ticket_sequence_via_api() {
    let ctx = TestContext::new().await.unwrap();
    let queue = ctx.create_queue("Front desk", "A").await.unwrap();

    for expected in ["A001", "A002", "A003"] {
        let response = ctx
            .send(
                "POST",
                &format!("/queues/{}/generate-ticket", queue.id),
                None,
                true,
            )
            .await;
        let ticket = assert_status(response, StatusCode::OK).await;
        assert_eq!(ticket["displayNumber"], expected);
        assert_eq!(ticket["status"], "WAITING");
    }

    // The dashboard list reflects the waiting count.
    let response = ctx.send("GET", "/queues", None, true).await;
    let queues = assert_status(response, StatusCode::OK).await;
    let row = queues
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["id"] == queue.id.to_string())
        .expect("queue should be listed");
    assert_eq!(row["waitingCount"], 3);
    assert_eq!(row["currentNumber"], 3);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_display_number_beyond_three_digits() {
    let ctx = TestContext::new().await.unwrap();
    let queue = ctx.create_queue("Front desk", "A").await.unwrap();

    sqlx::query("UPDATE queues SET current_number = 999 WHERE id = $1")
        .bind(queue.id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let issued = sequence::issue_ticket(&ctx.db, queue.id).await.unwrap();
    assert_eq!(issued.ticket.number, 1000);
    assert_eq!(issued.ticket.display_number, "A1000");

    ctx.cleanup().await.unwrap();
}

/// N concurrent issues on one queue assign exactly {1..N}: no duplicates,
/// no gaps.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_issue_no_duplicates_no_gaps() {
    const N: usize = 20;

    let ctx = TestContext::new().await.unwrap();
    let queue = ctx.create_queue("Rush hour", "R").await.unwrap();

    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let pool = ctx.db.clone();
        let queue_id = queue.id;
        handles.push(tokio::spawn(async move {
            sequence::issue_ticket(&pool, queue_id).await
        }));
    }

    let mut numbers = HashSet::new();
    let mut labels = HashSet::new();
    for handle in handles {
        let issued = handle.await.unwrap().expect("issue should not conflict");
        numbers.insert(issued.ticket.number);
        labels.insert(issued.ticket.display_number);
    }

    let expected: HashSet<i32> = (1..=N as i32).collect();
    assert_eq!(numbers, expected);
    assert_eq!(labels.len(), N);

    let final_queue = sqlx::query_as::<_, (i32,)>("SELECT current_number FROM queues WHERE id = $1")
        .bind(queue.id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(final_queue.0, N as i32);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_call_next_is_fifo() {
    let ctx = TestContext::new().await.unwrap();
    let queue = ctx.create_queue("Front desk", "F").await.unwrap();

    for _ in 0..3 {
        sequence::issue_ticket(&ctx.db, queue.id).await.unwrap();
    }

    for expected in ["F001", "F002", "F003"] {
        let response = ctx
            .send("POST", &format!("/queues/{}/next", queue.id), None, true)
            .await;
        let ticket = assert_status(response, StatusCode::OK).await;
        assert_eq!(ticket["displayNumber"], expected);
        assert_eq!(ticket["status"], "IN_PROGRESS");
        assert!(ticket["calledAt"].is_string());
    }

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_call_next_empty_queue() {
    let ctx = TestContext::new().await.unwrap();
    let queue = ctx.create_queue("Quiet day", "Q").await.unwrap();

    let response = ctx
        .send("POST", &format!("/queues/{}/next", queue.id), None, true)
        .await;
    assert_status(response, StatusCode::BAD_REQUEST).await;

    // Nothing was mutated.
    let response = ctx
        .send("GET", &format!("/queues/{}", queue.id), None, true)
        .await;
    let detail = assert_status(response, StatusCode::OK).await;
    assert_eq!(detail["queue"]["currentNumber"], 0);
    assert_eq!(detail["waitingTickets"].as_array().unwrap().len(), 0);
    assert_eq!(detail["inProgressTickets"].as_array().unwrap().len(), 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_full_ticket_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let queue = ctx.create_queue("Front desk", "A").await.unwrap();

    let issued = sequence::issue_ticket(&ctx.db, queue.id).await.unwrap();

    let response = ctx
        .send("POST", &format!("/queues/{}/next", queue.id), None, true)
        .await;
    let called = assert_status(response, StatusCode::OK).await;
    assert_eq!(called["id"], issued.ticket.id.to_string());

    let response = ctx
        .send(
            "POST",
            &format!("/tickets/{}/finish", issued.ticket.id),
            None,
            true,
        )
        .await;
    let done = assert_status(response, StatusCode::OK).await;

    assert_eq!(done["status"], "DONE");
    let created_at = timestamp(&done["createdAt"]);
    let called_at = timestamp(&done["calledAt"]);
    let finished_at = timestamp(&done["finishedAt"]);
    assert!(created_at <= called_at);
    assert!(called_at <= finished_at);

    // Finishing again is an invalid transition.
    let response = ctx
        .send(
            "POST",
            &format!("/tickets/{}/finish", issued.ticket.id),
            None,
            true,
        )
        .await;
    assert_status(response, StatusCode::BAD_REQUEST).await;

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_finish_requires_in_progress() {
    let ctx = TestContext::new().await.unwrap();
    let queue = ctx.create_queue("Front desk", "A").await.unwrap();

    let issued = sequence::issue_ticket(&ctx.db, queue.id).await.unwrap();

    // Still WAITING: finish is rejected and the ticket is unchanged.
    let response = ctx
        .send(
            "POST",
            &format!("/tickets/{}/finish", issued.ticket.id),
            None,
            true,
        )
        .await;
    assert_status(response, StatusCode::BAD_REQUEST).await;

    let response = ctx
        .send("GET", &format!("/queues/{}", queue.id), None, true)
        .await;
    let detail = assert_status(response, StatusCode::OK).await;
    let waiting = detail["waitingTickets"].as_array().unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0]["status"], "WAITING");
    assert!(waiting[0].get("finishedAt").is_none());

    // A ticket that does not exist at all is a 404.
    let response = ctx
        .send(
            "POST",
            &format!("/tickets/{}/finish", Uuid::new_v4()),
            None,
            true,
        )
        .await;
    assert_status(response, StatusCode::NOT_FOUND).await;

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_tenant_isolation() {
    let ctx = TestContext::new().await.unwrap();
    let other = TestContext::new().await.unwrap();

    let queue = ctx.create_queue("Front desk", "A").await.unwrap();
    sequence::issue_ticket(&ctx.db, queue.id).await.unwrap();
    let called = sequence::call_next(&ctx.db, queue.id).await.unwrap();

    // Another company's session sees none of it.
    let response = other
        .send("GET", &format!("/queues/{}", queue.id), None, true)
        .await;
    assert_status(response, StatusCode::NOT_FOUND).await;

    let response = other
        .send(
            "POST",
            &format!("/queues/{}/generate-ticket", queue.id),
            None,
            true,
        )
        .await;
    assert_status(response, StatusCode::NOT_FOUND).await;

    let response = other
        .send("POST", &format!("/tickets/{}/finish", called.id), None, true)
        .await;
    assert_status(response, StatusCode::NOT_FOUND).await;

    other.cleanup().await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_public_kiosk_and_display() {
    let ctx = TestContext::new().await.unwrap();
    let queue = ctx.create_queue("Front desk", "A").await.unwrap();

    // Queue info is readable without credentials.
    let response = ctx
        .send("GET", &format!("/public/queue/{}", queue.id), None, false)
        .await;
    let info = assert_status(response, StatusCode::OK).await;
    assert_eq!(info["prefix"], "A");
    assert_eq!(info["company"]["name"], ctx.company.name.as_str());

    // The kiosk issues a ticket and gets names for the printed stub.
    let response = ctx
        .send(
            "POST",
            &format!("/public/queue/{}/generate-ticket", queue.id),
            None,
            false,
        )
        .await;
    let issued = assert_status(response, StatusCode::OK).await;
    assert_eq!(issued["ticket"]["displayNumber"], "A001");
    assert_eq!(issued["queueName"], "Front desk");
    assert_eq!(issued["companyName"], ctx.company.name.as_str());

    // Serve the first ticket, finish it, issue a second one and call it.
    let first = sequence::call_next(&ctx.db, queue.id).await.unwrap();
    sequence::finish(&ctx.db, first.id).await.unwrap();
    sequence::issue_ticket(&ctx.db, queue.id).await.unwrap();
    sequence::call_next(&ctx.db, queue.id).await.unwrap();

    let response = ctx
        .send(
            "GET",
            &format!("/public/display/{}", ctx.company.id),
            None,
            false,
        )
        .await;
    let board = assert_status(response, StatusCode::OK).await;

    let current = board["currentTickets"].as_array().unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0]["displayNumber"], "A002");
    assert_eq!(current[0]["queue"]["prefix"], "A");

    let recent = board["recentTickets"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["displayNumber"], "A001");
    assert_eq!(recent[0]["status"], "DONE");

    // Unknown IDs are 404s.
    let response = ctx
        .send(
            "GET",
            &format!("/public/display/{}", Uuid::new_v4()),
            None,
            false,
        )
        .await;
    assert_status(response, StatusCode::NOT_FOUND).await;

    ctx.cleanup().await.unwrap();
}
