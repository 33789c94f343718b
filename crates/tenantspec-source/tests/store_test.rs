//! Integration tests for sources and the tenant store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tenantspec_config::TenantConfig;
use tenantspec_source::{
  FileSource, Overview, RefreshOutcome, Source, SourceError, State, StaticSource, TenantOverview,
  TenantStore,
};
use tokio_util::sync::CancellationToken;

const TENANT_YAML: &str = r#"
identifier: dev.example.app
tenantVersion: 1
modules:
  - name: getUser
    namespace: db
    ref: abc
  - name: respond
    namespace: api
    ref: def
defaultNamespace:
  workflows:
    - name: user
      steps:
        - fn: db::getUser
          as: user
        - fn: api::respond
          with:
            user: user
      triggers:
        - method: GET
          resource: /user/:id
"#;

#[tokio::test]
async fn test_file_source_reads_tenant_files() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::write(dir.path().join("dev.example.app.yaml"), TENANT_YAML).unwrap();
  std::fs::write(dir.path().join("notes.txt"), "not a tenant").unwrap();

  let source = FileSource::new(dir.path());

  let overview = source.overview().await.unwrap();
  assert_eq!(overview.state.system_version, 1);
  assert_eq!(overview.tenant_refs.identifiers["dev.example.app"], 1);

  let tenant = source.tenant_overview("dev.example.app").await.unwrap();
  assert_eq!(tenant.version, 1);
  assert_eq!(
    tenant.config.unwrap().modules[0].fqmn.as_deref(),
    Some("fqmn://dev.example.app/db/getUser@abc")
  );

  let module = source
    .module("fqmn://dev.example.app/api/respond@def")
    .await
    .unwrap();
  assert_eq!(module.name, "respond");

  assert!(matches!(
    source.tenant_overview("com.other").await,
    Err(SourceError::TenantNotFound(_))
  ));
}

#[tokio::test]
async fn test_store_follows_file_updates() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("dev.example.app.yaml");
  std::fs::write(&path, TENANT_YAML).unwrap();

  let store = TenantStore::new("dev.example.app", FileSource::new(dir.path()));
  assert!(matches!(
    store.refresh().await.unwrap(),
    RefreshOutcome::Updated { version: 1 }
  ));

  let mut config = TenantConfig::from_yaml(TENANT_YAML.as_bytes()).unwrap();
  config.tenant_version = 2;
  std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

  assert!(matches!(
    store.refresh().await.unwrap(),
    RefreshOutcome::Updated { version: 2 }
  ));
}

/// Fails a fixed number of fetches before delegating to an inner source.
struct FlakySource {
  failures: AtomicUsize,
  attempts: AtomicUsize,
  inner: StaticSource,
}

impl FlakySource {
  fn new(failures: usize) -> Self {
    Self {
      failures: AtomicUsize::new(failures),
      attempts: AtomicUsize::new(0),
      inner: StaticSource::new(),
    }
  }
}

#[async_trait]
impl Source for FlakySource {
  async fn state(&self) -> Result<State, SourceError> {
    self.inner.state().await
  }

  async fn overview(&self) -> Result<Overview, SourceError> {
    self.inner.overview().await
  }

  async fn tenant_overview(&self, ident: &str) -> Result<TenantOverview, SourceError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);

    if self.failures.load(Ordering::SeqCst) > 0 {
      self.failures.fetch_sub(1, Ordering::SeqCst);
      return Err(SourceError::Unavailable("connection refused".to_string()));
    }

    self.inner.tenant_overview(ident).await
  }
}

fn published_tenant() -> TenantConfig {
  TenantConfig::from_yaml(TENANT_YAML.as_bytes()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_ready_retries_until_config_is_served() {
  let source = FlakySource::new(3);
  source.inner.publish(published_tenant()).await;

  let store = TenantStore::new("dev.example.app", source);
  let cancel = CancellationToken::new();

  let version = store.ready(Duration::from_secs(1), &cancel).await;
  assert_eq!(version, Some(1));
  assert_eq!(store.source().attempts.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_ready_stops_when_cancelled() {
  let store = TenantStore::new("dev.example.app", FlakySource::new(usize::MAX));
  let cancel = CancellationToken::new();
  cancel.cancel();

  assert_eq!(store.ready(Duration::from_secs(1), &cancel).await, None);
}

#[tokio::test(start_paused = true)]
async fn test_sync_picks_up_new_versions() {
  let store = Arc::new(TenantStore::new("dev.example.app", FlakySource::new(2)));
  store.source().inner.publish(published_tenant()).await;

  let cancel = CancellationToken::new();
  let handle = tokio::spawn({
    let store = Arc::clone(&store);
    let cancel = cancel.clone();
    async move {
      store
        .sync(Duration::from_secs(10), Duration::from_secs(1), cancel)
        .await
    }
  });

  tokio::time::sleep(Duration::from_secs(5)).await;
  assert_eq!(store.version().await, Some(1));

  let mut next = published_tenant();
  next.tenant_version = 2;
  store.source().inner.publish(next).await;

  tokio::time::sleep(Duration::from_secs(11)).await;
  assert_eq!(store.version().await, Some(2));

  cancel.cancel();
  handle.await.unwrap();
}
