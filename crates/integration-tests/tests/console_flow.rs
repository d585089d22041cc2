//! Full console flows over HTTP: sign-in, role gating, the entity screens,
//! validation, and error surfacing.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use harper_integration_tests::{
    ADMIN_EMAIL, PASSWORD, STAFF_EMAIL, StubBackend, TestConsole, browser,
};

async fn sign_in(client: &reqwest::Client, console: &TestConsole, email: &str) {
    let response = client
        .post(console.url("/login"))
        .form(&[("email", email), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");
}

#[tokio::test]
async fn unauthenticated_visits_redirect_to_sign_in() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    for path in ["/", "/users", "/customers", "/productions"] {
        let response = client.get(console.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(response.headers()["location"], "/login", "path {path}");
    }
}

#[tokio::test]
async fn admin_signs_in_and_sees_the_user_table() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;

    let response = client.get(console.url("/users")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Alda Braga"));
    assert!(body.contains("Silvio Prado"));

    // The backend saw the bearer token issued at sign-in.
    let headers = backend.state.authorization_headers();
    let bearer = headers.last().unwrap().as_deref().unwrap();
    assert!(bearer.starts_with("Bearer tok"), "got {bearer}");
}

#[tokio::test]
async fn non_admin_is_redirected_after_profile_resolves_and_menu_is_hidden() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, STAFF_EMAIL).await;

    // The users screen bounces non-administrators back to the dashboard.
    let response = client.get(console.url("/users")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");

    // And the admin-only menu entry is absent from their pages.
    let response = client.get(console.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(!body.contains("href=\"/users\""));
}

#[tokio::test]
async fn invalid_email_blocks_the_backend_call_and_shows_a_field_error() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;

    let response = client
        .post(console.url("/users"))
        .form(&[
            ("name", "Bia Costa"),
            ("email", "not-an-email"),
            ("password", "hunter22"),
        ])
        .send()
        .await
        .unwrap();

    // Re-rendered with a field-scoped error next to the input...
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("must contain an @ symbol"));
    // ...and the in-progress value preserved.
    assert!(body.contains("value=\"not-an-email\""));

    // No create request ever reached the backend.
    assert_eq!(backend.state.records("users").len(), 2);
}

#[tokio::test]
async fn backend_rejection_shows_the_server_message_verbatim() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;
    backend
        .state
        .fail_next_mutation(422, Some("Email already in use"));

    let response = client
        .post(console.url("/users"))
        .form(&[
            ("name", "Bia Costa"),
            ("email", "bia@harper.example"),
            ("password", "hunter22"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Email already in use"));
    // The dialog stays open with the operator's values intact.
    assert!(body.contains("value=\"Bia Costa\""));
}

#[tokio::test]
async fn create_invalidates_the_list_and_the_new_row_appears() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;

    // Prime the cache.
    client.get(console.url("/users")).send().await.unwrap();
    assert_eq!(backend.state.fetch_count("users"), 1);

    let response = client
        .post(console.url("/users"))
        .form(&[
            ("name", "Bia Costa"),
            ("email", "bia@harper.example"),
            ("password", "hunter22"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/users");

    let body = client
        .get(console.url("/users"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Bia Costa"));
    // Exactly one refetch: the one the invalidation forced.
    assert_eq!(backend.state.fetch_count("users"), 2);
}

#[tokio::test]
async fn remounting_a_list_screen_does_not_refetch() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;

    for _ in 0..3 {
        let response = client.get(console.url("/users")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Three visits, one backend fetch: freshness is infinite and only
    // invalidation triggers a refetch.
    assert_eq!(backend.state.fetch_count("users"), 1);
}

#[tokio::test]
async fn confirmed_delete_removes_the_row_from_the_next_list() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;
    client.get(console.url("/users")).send().await.unwrap();

    let response = client
        .post(console.url("/users/2/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = client
        .get(console.url("/users"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!body.contains("Silvio Prado"));
}

#[tokio::test]
async fn insurer_list_fields_are_comma_split_before_transmission() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;

    let response = client
        .post(console.url("/insurers"))
        .form(&[
            ("name", "Atlas Seguros"),
            ("policyNumber", "POL-0042"),
            ("insuranceTypes", " auto , home "),
            ("maxCoverageAmount", "500000.50"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let records = backend.state.records("insurance");
    assert_eq!(records.len(), 1);
    // The wire payload is typed JSON: a real array and a real number.
    assert_eq!(
        records[0]["insuranceTypes"],
        serde_json::json!(["auto", "home"])
    );
    assert_eq!(records[0]["maxCoverageAmount"], serde_json::json!(500000.5));
}

#[tokio::test]
async fn production_amount_crosses_the_wire_as_a_number() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;

    let response = client
        .post(console.url("/productions"))
        .form(&[
            ("serviceName", "Fleet coverage"),
            ("insuranceCompany", "Atlas Seguros"),
            ("producer", "Rui Alves"),
            ("coverageStartDate", "2026-01-01"),
            ("coverageEndDate", "2026-12-31"),
            ("totalCoverageAmount", "250000.50"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let records = backend.state.records("productions");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0]["totalCoverageAmount"],
        serde_json::json!(250000.5)
    );
    assert_eq!(records[0]["coverageStartDate"], "2026-01-01");
}

#[tokio::test]
async fn negative_production_amount_is_rejected_locally() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;

    let response = client
        .post(console.url("/productions"))
        .form(&[
            ("serviceName", "Fleet coverage"),
            ("insuranceCompany", "Atlas Seguros"),
            ("producer", "Rui Alves"),
            ("coverageStartDate", "2026-01-01"),
            ("coverageEndDate", "2026-12-31"),
            ("totalCoverageAmount", "-5"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("must be at least 0"));
    assert!(backend.state.records("productions").is_empty());
}

#[tokio::test]
async fn sign_out_destroys_the_session() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    sign_in(&client, &console, ADMIN_EMAIL).await;

    let response = client.post(console.url("/logout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/login");

    // Everything is gated again.
    let response = client.get(console.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/login");
}

#[tokio::test]
async fn failed_sign_in_shows_invalid_credentials() {
    let backend = StubBackend::spawn().await;
    let console = TestConsole::spawn(&backend).await;
    let client = browser();

    let response = client
        .post(console.url("/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", "wrong")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid credentials."));
}
