//! Contract Test: Credential Resolution
//!
//! Constraints verified:
//! - Credentials from a referenced secret reach the provider factory
//! - Secret values override inline values
//! - A failing secret lookup aborts the reconcile before any provider call
//!
//! If this test fails, solvers may run with the wrong account.

mod common;

use common::*;
use dns01_core::challenge::ChallengeAction;
use dns01_core::config::EngineConfig;
use dns01_core::secrets::{FileSecretStore, MemorySecretStore};
use dns01_core::{ConfigResolver, Error};
use std::sync::Arc;

fn secret_ref_config() -> serde_json::Value {
    serde_json::json!({
        "email": "ops@example.com",
        "apiKeySecretRef": {"name": "alidns-credentials"},
        "accessKeyID": "inline-id",
        "regionID": "cn-beijing"
    })
}

#[tokio::test]
async fn secret_credentials_reach_factory() {
    let store = MemorySecretStore::new();
    store
        .insert(
            "cert-manager",
            "alidns-credentials",
            [("access-key", "secret-id"), ("accessKeySecret", "secret-secret")],
        )
        .await;

    let factory = MockProviderFactory::new(MockDnsProvider::new());
    let solver = solver_with(
        &factory,
        ConfigResolver::new(Arc::new(store)),
        EngineConfig::default(),
    );

    let mut request = challenge(ChallengeAction::Present, "token-1");
    request.config = Some(secret_ref_config());

    solver.reconcile(&request).await.unwrap();

    let seen = factory.seen_configs();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].access_key_id, "secret-id");
    assert_eq!(seen[0].access_key_secret, "secret-secret");
    assert_eq!(seen[0].region_id, "cn-beijing");
}

#[tokio::test]
async fn secret_lookup_is_scoped_to_request_namespace() {
    let store = MemorySecretStore::new();
    store
        .insert(
            "other-namespace",
            "alidns-credentials",
            [("access-key", "id"), ("secret-key", "secret")],
        )
        .await;

    let factory = MockProviderFactory::new(MockDnsProvider::new());
    let solver = solver_with(
        &factory,
        ConfigResolver::new(Arc::new(store)),
        EngineConfig::default(),
    );

    let mut request = challenge(ChallengeAction::Present, "token-1");
    request.config = Some(secret_ref_config());

    let err = solver.reconcile(&request).await.unwrap_err();
    match err {
        Error::Secret { namespace, name, .. } => {
            assert_eq!(namespace, "cert-manager");
            assert_eq!(name, "alidns-credentials");
        }
        other => panic!("expected secret error, got {:?}", other),
    }
    assert!(factory.provider.calls().is_empty());
}

#[tokio::test]
async fn mounted_secret_directory_supplies_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let secret_dir = dir.path().join("cert-manager").join("alidns-credentials");
    std::fs::create_dir_all(&secret_dir).unwrap();
    std::fs::write(secret_dir.join("accessKeyID"), b"file-id").unwrap();
    std::fs::write(secret_dir.join("secret-key"), b"file-secret").unwrap();

    let store = FileSecretStore::new(dir.path()).unwrap();
    let factory = MockProviderFactory::new(MockDnsProvider::new());
    let solver = solver_with(
        &factory,
        ConfigResolver::new(Arc::new(store)),
        EngineConfig::default(),
    );

    let mut request = challenge(ChallengeAction::CleanUp, "token-1");
    request.config = Some(secret_ref_config());

    solver.reconcile(&request).await.unwrap();

    let seen = factory.seen_configs();
    assert_eq!(seen[0].access_key_id, "file-id");
    assert_eq!(seen[0].access_key_secret, "file-secret");
}

#[tokio::test]
async fn incomplete_secret_is_config_error() {
    let store = MemorySecretStore::new();
    store
        .insert("cert-manager", "alidns-credentials", [("access-key", "id")])
        .await;

    let factory = MockProviderFactory::new(MockDnsProvider::new());
    let solver = solver_with(
        &factory,
        ConfigResolver::new(Arc::new(store)),
        EngineConfig::default(),
    );

    let mut request = challenge(ChallengeAction::Present, "token-1");
    request.config = Some(serde_json::json!({"apiKeySecretRef": {"name": "alidns-credentials"}}));

    let err = solver.reconcile(&request).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got {:?}", err);
    assert!(factory.seen_configs().is_empty());
}
