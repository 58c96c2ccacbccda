//! Integration tests for the startup sequence: credential resolution,
//! identity initialization and the fatal-error paths.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{frontend_fixture, test_config, test_credential, PROJECT_ID};
use neocart_api::startup::{initialize_identity, prepare, IdentityStatus, StartupError};
use neocart_core::credentials::{
    CredentialChain, CredentialError, EnvCredentialProvider, FileCredentialProvider,
    StaticCredentialProvider,
};
use neocart_identity::{IdentityError, IdentitySdk};

fn unset_var(name: &str) -> String {
    let var = format!("NEOCART_STARTUP_TEST_{name}");
    std::env::remove_var(&var);
    var
}

#[tokio::test]
async fn valid_credential_initializes_sdk() {
    let chain = CredentialChain::new().with(StaticCredentialProvider::new(Some(test_credential())));
    let sdk = IdentitySdk::new();

    let status = initialize_identity(&chain, &sdk, true).await.unwrap();

    assert_eq!(
        status,
        IdentityStatus::Initialized {
            source: "static".into()
        }
    );
    assert!(sdk.is_initialized());
    assert_eq!(sdk.app().unwrap().project_id(), PROJECT_ID);
}

#[tokio::test]
async fn env_var_takes_precedence_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("serviceAccountKey.json");
    let mut file_key = test_credential();
    file_key.project_id = "from-file".into();
    std::fs::write(&path, serde_json::to_string(&file_key).unwrap()).unwrap();

    let var = unset_var("PRECEDENCE");
    std::env::set_var(&var, serde_json::to_string(&test_credential()).unwrap());

    let sdk = IdentitySdk::new();
    let status = initialize_identity(&CredentialChain::standard(&var, &path), &sdk, false)
        .await
        .unwrap();

    assert_eq!(
        status,
        IdentityStatus::Initialized {
            source: format!("env:{var}")
        }
    );
    assert_eq!(sdk.app().unwrap().project_id(), PROJECT_ID);
    std::env::remove_var(&var);
}

#[tokio::test]
async fn file_is_used_when_env_var_is_unset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("serviceAccountKey.json");
    std::fs::write(&path, serde_json::to_string(&test_credential()).unwrap()).unwrap();

    let var = unset_var("FILE_FALLBACK");
    let sdk = IdentitySdk::new();
    let status = initialize_identity(&CredentialChain::standard(&var, &path), &sdk, false)
        .await
        .unwrap();

    assert_matches!(status, IdentityStatus::Initialized { source } if source.starts_with("file:"));
    assert!(sdk.is_initialized());
}

#[tokio::test]
async fn malformed_env_credential_is_fatal() {
    let var = unset_var("MALFORMED");
    std::env::set_var(&var, "{ not json");

    let chain = CredentialChain::new().with(EnvCredentialProvider::new(&var));
    let sdk = IdentitySdk::new();
    let result = initialize_identity(&chain, &sdk, false).await;

    assert_matches!(
        result,
        Err(StartupError::Credentials(CredentialError::Malformed { .. }))
    );
    assert!(!sdk.is_initialized());
    std::env::remove_var(&var);
}

#[tokio::test]
async fn malformed_file_credential_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("serviceAccountKey.json");
    std::fs::write(&path, r#"{"type":"authorized_user"}"#).unwrap();

    let chain = CredentialChain::new().with(FileCredentialProvider::new(&path));
    let result = initialize_identity(&chain, &IdentitySdk::new(), false).await;

    assert_matches!(
        result,
        Err(StartupError::Credentials(CredentialError::Malformed { .. }))
    );
}

#[tokio::test]
async fn no_credentials_runs_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let var = unset_var("DEGRADED");
    let chain = CredentialChain::standard(&var, dir.path().join("missing.json"));
    let sdk = IdentitySdk::new();

    let status = initialize_identity(&chain, &sdk, false).await.unwrap();

    assert_eq!(status, IdentityStatus::Degraded);
    assert!(!sdk.is_initialized());
}

#[tokio::test]
async fn no_credentials_is_fatal_when_required() {
    let dir = tempfile::tempdir().unwrap();
    let var = unset_var("REQUIRED");
    let chain = CredentialChain::standard(&var, dir.path().join("missing.json"));

    let result = initialize_identity(&chain, &IdentitySdk::new(), true).await;

    assert_matches!(result, Err(StartupError::MissingCredentials { checked }) => {
        assert!(checked.contains(&var));
        assert!(checked.contains("missing.json"));
    });
}

#[tokio::test]
async fn second_initialization_is_rejected() {
    let chain = CredentialChain::new().with(StaticCredentialProvider::new(Some(test_credential())));
    let sdk = IdentitySdk::new();

    initialize_identity(&chain, &sdk, false).await.unwrap();
    let result = initialize_identity(&chain, &sdk, false).await;

    assert_matches!(
        result,
        Err(StartupError::Identity(IdentityError::AlreadyInitialized))
    );
    assert!(sdk.is_initialized());
}

#[tokio::test]
async fn prepare_stops_on_credential_error_before_database() {
    let dist = frontend_fixture();
    let var = unset_var("PREPARE_MALFORMED");
    std::env::set_var(&var, "[]");

    let config = Arc::new(test_config(dist.path()));
    let chain = CredentialChain::new().with(EnvCredentialProvider::new(&var));
    let result = prepare(config, chain, Arc::new(IdentitySdk::new()))
        .await
        .map(|_| ());

    assert_matches!(result, Err(StartupError::Credentials(_)));
    std::env::remove_var(&var);
}

#[tokio::test]
async fn prepare_fails_when_database_is_unreachable() {
    let dist = frontend_fixture();
    let mut config = test_config(dist.path());
    config.startup_timeout_secs = 1;

    let result = prepare(
        Arc::new(config),
        CredentialChain::new(),
        Arc::new(IdentitySdk::new()),
    )
    .await
    .map(|_| ());

    assert_matches!(
        result,
        Err(StartupError::Database(_)) | Err(StartupError::Timeout(_))
    );
}
