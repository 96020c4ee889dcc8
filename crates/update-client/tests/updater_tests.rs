//! End-to-end tests driving the production HTTP transport against a mock
//! HTTP server.

use std::fs;
use std::path::Path;

use tempfile::tempdir;
use update_client::{NetworkProbe, Updater, UpdaterConfig, UpdaterError, Version};
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct OnlineProbe;

impl NetworkProbe for OnlineProbe {
    fn is_available(&self) -> bool {
        true
    }
}

fn config_for(server: &MockServer, dir: &Path) -> UpdaterConfig {
    UpdaterConfig::builder()
        .version_url(format!("{}/version.txt", server.uri()))
        .updater_url(format!("{}/updater.bin", server.uri()))
        .changelog_url(format!("{}/changelog.txt", server.uri()))
        .local_dir(dir)
        .build()
        .expect("valid config")
}

#[tokio::test]
async fn reads_trimmed_version_marker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(" 50\n"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let updater = Updater::new(config_for(&server, dir.path()))
        .unwrap()
        .with_probe(OnlineProbe);

    assert_eq!(updater.fetch_latest_version().await.unwrap(), Version(50));
    assert!(updater.is_update_available(Version(49)).await.unwrap());
    assert!(!updater.is_update_available(Version(50)).await.unwrap());
    assert!(!updater.is_update_available(Version(51)).await.unwrap());
}

#[tokio::test]
async fn version_endpoint_error_is_a_version_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let updater = Updater::new(config_for(&server, dir.path()))
        .unwrap()
        .with_probe(OnlineProbe);

    let err = updater.fetch_latest_version().await.unwrap_err();
    assert!(matches!(err, UpdaterError::VersionFetch(_)));
}

#[tokio::test]
async fn sends_basic_auth_when_credentials_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/version.txt"))
        .and(basic_auth("updates", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("7"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = UpdaterConfig::builder()
        .version_url(format!("{}/version.txt", server.uri()))
        .updater_url(format!("{}/updater.bin", server.uri()))
        .local_dir(dir.path())
        .credentials("updates", "hunter2")
        .build()
        .unwrap();
    let updater = Updater::new(config).unwrap().with_probe(OnlineProbe);

    // The mock only matches when the Authorization header is present.
    assert_eq!(updater.fetch_latest_version().await.unwrap(), Version(7));
}

#[tokio::test]
async fn downloads_artifact_with_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/updater.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"update"[..]))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let updater = Updater::new(config_for(&server, dir.path()))
        .unwrap()
        .with_probe(OnlineProbe);

    let mut download = updater.download_update().unwrap();
    let mut last = None;
    while let Some(progress) = download.next_progress().await {
        last = Some(progress);
    }
    let artifact = download.wait().await.unwrap();

    assert_eq!(artifact, dir.path().join("updater.bin"));
    assert_eq!(fs::read_to_string(&artifact).unwrap(), "update");
    let last = last.expect("at least one progress event");
    assert_eq!(last.bytes_received, 6);
    assert_eq!(last.total_bytes, Some(6));
}

#[tokio::test]
async fn transfer_error_reaches_the_completion_channel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/updater.bin"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let updater = Updater::new(config_for(&server, dir.path()))
        .unwrap()
        .with_probe(OnlineProbe);

    let download = updater.download_update().unwrap();
    let err = download.wait().await.unwrap_err();
    assert!(matches!(err, UpdaterError::UpdateFetch(_)));
}

#[tokio::test]
async fn fetches_saves_and_cleans_changelog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/changelog.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  changelog  "))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let updater = Updater::new(config_for(&server, dir.path()))
        .unwrap()
        .with_probe(OnlineProbe);

    assert_eq!(updater.fetch_changelog().await.unwrap(), "changelog");

    let saved = updater.save_changelog().await.unwrap();
    assert_eq!(saved, dir.path().join("changelog.txt"));
    assert_eq!(fs::read_to_string(&saved).unwrap(), "changelog");

    fs::write(dir.path().join("updater.bin"), b"update").unwrap();
    updater.clean().unwrap();
    assert!(!saved.exists());
    assert!(!dir.path().join("updater.bin").exists());

    // Idempotent.
    updater.clean().unwrap();
}
