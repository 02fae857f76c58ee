//! Resolver behavior against a live (mock) authentication status endpoint.

use identity::{IdentityResolver, IdentitySource, IdentityStore, TEST_USER_ID};
use integration_tests::{MockBackend, TestEnv};
use serde_json::json;

fn principal() -> serde_json::Value {
    json!({
        "userId": "github-7341",
        "userDetails": "Ada Lovelace",
        "identityProvider": "github",
        "claims": [
            { "type": "name", "value": "Ada Lovelace" }
        ]
    })
}

fn resolver_for(backend: &MockBackend, dir: &tempfile::TempDir) -> IdentityResolver {
    let store = IdentityStore::new(dir.path().join("identity.json"));
    let status_url = backend.url().join("/.auth/me").unwrap();

    IdentityResolver::new(store, status_url)
}

#[tokio::test]
async fn all_provider_shapes_resolve_to_the_same_identity() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver_for(&backend, &dir);

    backend.set_auth_response(200, json!({ "clientPrincipal": principal() }));
    let wrapped = resolver.resolve().await.unwrap();

    backend.set_auth_response(200, json!([principal()]));
    let listed = resolver.resolve().await.unwrap();

    backend.set_auth_response(200, principal());
    let bare = resolver.resolve().await.unwrap();

    assert_eq!(wrapped.identity, listed.identity);
    assert_eq!(listed.identity, bare.identity);
    assert_eq!(bare.identity.user_id, "github-7341");
    assert_eq!(bare.source, IdentitySource::Provider);
}

#[tokio::test]
async fn non_success_statuses_resolve_to_unauthenticated() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver_for(&backend, &dir);

    for status in [401, 404, 500, 503] {
        backend.set_auth_response(status, json!({ "error": "nope" }));
        assert_eq!(resolver.resolve().await, None, "status {status} should be unauthenticated");
    }
}

#[tokio::test]
async fn unreachable_endpoint_resolves_to_unauthenticated() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let store = IdentityStore::new(dir.path().join("identity.json"));
    let status_url = url::Url::parse(&format!("http://{address}/.auth/me")).unwrap();

    let resolver = IdentityResolver::new(store, status_url);

    assert_eq!(resolver.resolve().await, None);
}

#[tokio::test]
async fn null_and_unrecognized_bodies_resolve_to_unauthenticated() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver_for(&backend, &dir);

    backend.set_auth_response(200, json!({ "clientPrincipal": null }));
    assert_eq!(resolver.resolve().await, None);

    backend.set_auth_response(200, json!("unexpected"));
    assert_eq!(resolver.resolve().await, None);
}

#[tokio::test]
async fn corrupt_store_record_falls_through_to_the_provider() {
    let backend = MockBackend::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("identity.json"), "{ not json").unwrap();

    backend.set_auth_response(200, principal());
    let resolved = resolver_for(&backend, &dir).resolve().await.unwrap();

    assert_eq!(resolved.source, IdentitySource::Provider);
    assert_eq!(resolved.identity.user_id, "github-7341");
}

#[tokio::test]
async fn synthesized_identity_wins_over_the_provider() {
    let env = TestEnv::spawn().await;
    env.backend.set_auth_response(200, principal());

    env.login("Grace Hopper");
    let resolved = env.identity.refresh().await.unwrap();

    assert_eq!(resolved.identity.user_id, TEST_USER_ID);
    assert_eq!(resolved.source, IdentitySource::Synthesized);
}

#[tokio::test]
async fn synthesize_then_clear_round_trip() {
    let env = TestEnv::spawn().await;

    env.login("Ada Lovelace");
    let resolved = env.identity.refresh().await.unwrap();

    assert_eq!(resolved.identity.user_id, TEST_USER_ID);
    assert_eq!(resolved.identity.provider, "github");

    let name_claim = resolved
        .identity
        .claims
        .iter()
        .find(|claim| claim.claim_type == "name")
        .unwrap();
    assert_eq!(name_claim.value, "Ada Lovelace");

    env.identity.clear().unwrap();

    // The auth endpoint still answers 401, so nothing is left to resolve.
    assert_eq!(env.identity.refresh().await, None);
}

#[tokio::test]
async fn current_reads_the_cache_without_resolving() {
    let env = TestEnv::spawn().await;
    env.backend.set_auth_response(200, principal());

    assert_eq!(env.identity.current(), None);

    let resolved = env.identity.refresh().await.unwrap();
    assert_eq!(env.identity.current(), Some(resolved));

    // Provider logout happens behind our back. The cache only notices on
    // the next explicit refresh.
    env.backend.set_auth_response(401, json!({ "error": "logged out" }));
    assert!(env.identity.current().is_some());
    assert_eq!(env.identity.refresh().await, None);
    assert_eq!(env.identity.current(), None);
}
