use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use url::Url;

use crate::{
    Claim, Identity, IdentitySource, ResolvedIdentity,
    principal,
    store::{IdentityStore, StoreError},
};

/// Fixed user id of the locally synthesized development identity.
pub const TEST_USER_ID: &str = "test-user-123";

const TEST_PROVIDER: &str = "github";
const TEST_EMAIL: &str = "test@example.com";

/// Resolves the current identity from the local store or the external
/// authentication status endpoint.
#[derive(Debug)]
pub struct IdentityResolver {
    store: IdentityStore,
    http: reqwest::Client,
    status_url: Url,
}

impl IdentityResolver {
    /// Create a resolver over the given store and status endpoint.
    pub fn new(store: IdentityStore, status_url: Url) -> Self {
        Self {
            store,
            http: reqwest::Client::new(),
            status_url,
        }
    }

    /// Resolve the current identity.
    ///
    /// The local store wins over the provider. Every failure along the way
    /// degrades to `None`: being unauthenticated is a normal outcome, not an
    /// error condition.
    pub async fn resolve(&self) -> Option<ResolvedIdentity> {
        if let Some(identity) = self.store.read() {
            return Some(ResolvedIdentity {
                identity,
                source: IdentitySource::Synthesized,
            });
        }

        let response = match self.http.get(self.status_url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("authentication status endpoint unreachable: {e}");
                return None;
            }
        };

        let status = response.status();

        if !status.is_success() {
            log::debug!("authentication status endpoint returned {status}");
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                log::debug!("authentication status body unreadable: {e}");
                return None;
            }
        };

        principal::decode(&body).map(|identity| ResolvedIdentity {
            identity,
            source: IdentitySource::Provider,
        })
    }

    /// Write the deterministic development identity to the store and return
    /// it. The result is indistinguishable in shape from a provider-resolved
    /// identity; only its provenance differs.
    pub fn synthesize(&self, name: &str) -> Result<ResolvedIdentity, StoreError> {
        let identity = Identity {
            user_id: TEST_USER_ID.to_string(),
            display_name: name.to_string(),
            provider: TEST_PROVIDER.to_string(),
            claims: vec![
                Claim::new("name", name),
                Claim::new("preferred_username", TEST_EMAIL),
            ],
        };

        self.store.write(&identity)?;
        log::info!("synthesized development identity for '{name}'");

        Ok(ResolvedIdentity {
            identity,
            source: IdentitySource::Synthesized,
        })
    }

    /// Remove the locally synthesized identity. A provider-resolved identity
    /// is unaffected; ending that session is the provider's logout endpoint.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.clear()
    }
}

/// Explicit handle to the current identity, shared between the API client
/// and the rest of the application.
///
/// The cached value is refreshed only on explicit triggers; nothing here
/// polls the status endpoint. Concurrent refreshes race benignly: each
/// resolution carries a generation, and a superseded resolution can never
/// overwrite a newer one.
#[derive(Debug)]
pub struct IdentityContext {
    resolver: IdentityResolver,
    slot: Mutex<Slot>,
    generations: AtomicU64,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    identity: Option<ResolvedIdentity>,
}

impl IdentityContext {
    /// Create a context with an empty cache.
    pub fn new(resolver: IdentityResolver) -> Self {
        Self {
            resolver,
            slot: Mutex::new(Slot::default()),
            generations: AtomicU64::new(0),
        }
    }

    /// The cached identity. Never touches the store or the network.
    pub fn current(&self) -> Option<ResolvedIdentity> {
        self.lock().identity.clone()
    }

    /// Run a resolution and update the cache.
    ///
    /// Returns the freshest known identity, which is the result of a newer
    /// refresh when this one was superseded mid-flight.
    pub async fn refresh(&self) -> Option<ResolvedIdentity> {
        let generation = self.next_generation();
        let resolved = self.resolver.resolve().await;

        let mut slot = self.lock();

        if generation >= slot.generation {
            slot.generation = generation;
            slot.identity = resolved;
        }

        slot.identity.clone()
    }

    /// Synthesize the development identity and make it current immediately,
    /// without waiting for a refresh round trip.
    pub fn synthesize(&self, name: &str) -> Result<ResolvedIdentity, StoreError> {
        let resolved = self.resolver.synthesize(name)?;

        let generation = self.next_generation();
        let mut slot = self.lock();

        if generation >= slot.generation {
            slot.generation = generation;
            slot.identity = Some(resolved.clone());
        }

        Ok(resolved)
    }

    /// Clear the locally synthesized identity. The cache drops a synthesized
    /// identity right away; a provider-resolved one stays until the provider
    /// session actually ends.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.resolver.clear()?;

        let generation = self.next_generation();
        let mut slot = self.lock();

        if generation >= slot.generation && slot.identity.as_ref().is_some_and(ResolvedIdentity::is_synthesized) {
            slot.generation = generation;
            slot.identity = None;
        }

        Ok(())
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().expect("identity slot lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::{IdentityContext, IdentityResolver, TEST_USER_ID};
    use crate::{IdentitySource, store::IdentityStore};

    fn context(dir: &tempfile::TempDir) -> IdentityContext {
        let store = IdentityStore::new(dir.path().join("identity.json"));
        let status_url = Url::parse("http://127.0.0.1:1/.auth/me").unwrap();

        IdentityContext::new(IdentityResolver::new(store, status_url))
    }

    #[test]
    fn cache_starts_empty() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(context(&dir).current(), None);
    }

    #[test]
    fn synthesize_makes_the_identity_current() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(&dir);

        let resolved = context.synthesize("Ada Lovelace").unwrap();

        assert_eq!(resolved.identity.user_id, TEST_USER_ID);
        assert_eq!(resolved.source, IdentitySource::Synthesized);
        assert_eq!(context.current(), Some(resolved));
    }

    #[test]
    fn clear_drops_the_synthesized_identity() {
        let dir = tempfile::tempdir().unwrap();
        let context = context(&dir);

        context.synthesize("Ada Lovelace").unwrap();
        context.clear().unwrap();

        assert_eq!(context.current(), None);
    }
}
