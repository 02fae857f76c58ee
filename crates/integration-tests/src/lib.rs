//! Test harness wiring a mock Sale Tracker backend, a temporary identity
//! store, and a client together for black-box tests.

pub mod backend;

use std::sync::Arc;

use api::ApiClient;
use config::{ApiConfig, Config, IdentityStoreConfig};
use identity::{IdentityContext, IdentityResolver, IdentityStore};
use tempfile::TempDir;

pub use backend::MockBackend;

/// A fully wired test environment.
///
/// The identity store lives in a temporary directory that is removed when
/// the environment is dropped.
pub struct TestEnv {
    /// The running mock backend.
    pub backend: MockBackend,
    /// Identity context shared with the client.
    pub identity: Arc<IdentityContext>,
    /// Client pointed at the mock backend.
    pub client: ApiClient,
    _store_dir: TempDir,
}

impl TestEnv {
    /// Boot a mock backend and build a client against it. The auth status
    /// endpoint starts out answering 401, so the environment is
    /// unauthenticated until a test says otherwise.
    pub async fn spawn() -> Self {
        let backend = MockBackend::spawn().await;
        let store_dir = tempfile::tempdir().expect("failed to create identity store directory");

        let config = Config {
            api: ApiConfig {
                base_url: backend.url(),
                timeout: None,
            },
            identity: IdentityStoreConfig {
                store_path: store_dir.path().join("identity.json"),
            },
            ..Config::default()
        };

        let store = IdentityStore::new(config.identity.store_path.clone());
        let status_url = config.auth_status_url().expect("status URL joins onto the mock base");
        let identity = Arc::new(IdentityContext::new(IdentityResolver::new(store, status_url)));

        let client = ApiClient::new(&config, identity.clone()).expect("failed to build API client");

        Self {
            backend,
            identity,
            client,
            _store_dir: store_dir,
        }
    }

    /// Synthesize the development identity and make it current.
    pub fn login(&self, name: &str) {
        self.identity.synthesize(name).expect("failed to synthesize identity");
    }
}
