//! Cache consistency laws, exercised end-to-end: a real `ApiClient`
//! against the stub backend, with the real `QueryCache` in between.

#![allow(clippy::unwrap_used)]

use harper_console::api::{ApiClient, Credentials, NewUser};
use harper_console::cache::{QueryCache, QueryKey};
use harper_core::{Email, UserId};
use harper_integration_tests::{ADMIN_EMAIL, PASSWORD, StubBackend};
use secrecy::SecretString;

async fn signed_in_client(backend: &StubBackend) -> ApiClient {
    let api = ApiClient::new(url::Url::parse(&backend.base_url()).unwrap());
    let token = api
        .sign_in(&Credentials {
            email: Email::parse(ADMIN_EMAIL).unwrap(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    api.set_token(SecretString::from(token.access_token)).await;
    api
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Bia Costa".to_string(),
        email: Email::parse(email).unwrap(),
        password: "hunter22".to_string(),
    }
}

#[tokio::test]
async fn list_stays_stale_until_its_key_is_invalidated() {
    let backend = StubBackend::spawn().await;
    let api = signed_in_client(&backend).await;
    let cache = QueryCache::new();

    let users = cache.users(&api).await.unwrap();
    assert_eq!(users.len(), 2);

    // Create behind the cache's back (no invalidation yet).
    api.create_user(&new_user("bia@harper.example"))
        .await
        .unwrap();

    // The cached pre-creation set is served; the backend sees no new list
    // fetch.
    let users = cache.users(&api).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(backend.state.fetch_count("users"), 1);

    // Only the explicit invalidation makes the creation visible.
    cache.invalidate(QueryKey::Users).await;
    let users = cache.users(&api).await.unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(backend.state.fetch_count("users"), 2);
}

#[tokio::test]
async fn deleted_row_is_gone_from_the_next_list() {
    let backend = StubBackend::spawn().await;
    let api = signed_in_client(&backend).await;
    let cache = QueryCache::new();

    let users = cache.users(&api).await.unwrap();
    assert!(users.iter().any(|u| u.id == UserId::new(2)));

    api.delete_user(UserId::new(2)).await.unwrap();
    cache.invalidate(QueryKey::Users).await;

    let users = cache.users(&api).await.unwrap();
    assert!(users.iter().all(|u| u.id != UserId::new(2)));
}

#[tokio::test]
async fn double_invalidation_costs_a_single_refetch() {
    let backend = StubBackend::spawn().await;
    let api = signed_in_client(&backend).await;
    let cache = QueryCache::new();

    cache.users(&api).await.unwrap();
    assert_eq!(backend.state.fetch_count("users"), 1);

    cache.invalidate(QueryKey::Users).await;
    cache.invalidate(QueryKey::Users).await;

    cache.users(&api).await.unwrap();
    cache.users(&api).await.unwrap();
    assert_eq!(backend.state.fetch_count("users"), 2);
}

#[tokio::test]
async fn profile_is_fetched_once_per_session() {
    let backend = StubBackend::spawn().await;
    let api = signed_in_client(&backend).await;
    let cache = QueryCache::new();

    let profile = cache.profile(&api).await.unwrap();
    assert!(profile.role.is_admin());

    cache.profile(&api).await.unwrap();
    cache.profile(&api).await.unwrap();
    assert_eq!(backend.state.fetch_count("auth/me"), 1);

    // Sign-out invalidates the profile; the next session refetches.
    cache.invalidate(QueryKey::Profile).await;
    cache.profile(&api).await.unwrap();
    assert_eq!(backend.state.fetch_count("auth/me"), 2);
}

#[tokio::test]
async fn keys_invalidate_independently() {
    let backend = StubBackend::spawn().await;
    let api = signed_in_client(&backend).await;
    let cache = QueryCache::new();

    cache.users(&api).await.unwrap();
    cache.customers(&api).await.unwrap();

    cache.invalidate(QueryKey::Customers).await;

    cache.users(&api).await.unwrap();
    cache.customers(&api).await.unwrap();

    assert_eq!(backend.state.fetch_count("users"), 1);
    assert_eq!(backend.state.fetch_count("customer"), 2);
}
