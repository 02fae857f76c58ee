//! Identity resolution for the saletrack client.
//!
//! The resolver produces the single source of truth for "who is the current
//! user" and keeps that answer consistent between a locally synthesized
//! development identity and one issued by the real authentication provider.
//! An absent identity is `None`, never an identity with an empty user id.

mod principal;
mod resolver;
mod store;

use serde::{Deserialize, Serialize};

pub use resolver::{IdentityContext, IdentityResolver, TEST_USER_ID};
pub use store::{IdentityStore, StoreError};

/// An authenticated principal in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable identifier of the principal. Non-empty by construction.
    pub user_id: String,
    /// Human-readable name shown in the UI.
    pub display_name: String,
    /// Name of the OAuth provider that issued the identity.
    pub provider: String,
    /// Provider claims, in the order the provider returned them. May be empty.
    #[serde(default)]
    pub claims: Vec<Claim>,
}

/// A single provider claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type, e.g. `name`.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Build a claim from a type and value.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Where a resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Synthesized locally for development, read from the identity store.
    Synthesized,
    /// Normalized from the external authentication status endpoint.
    Provider,
}

/// An identity together with its provenance.
///
/// The source decides whether the request bridge encodes the identity into
/// an outbound header: only synthesized identities travel that way, a
/// provider identity is re-injected by the production gateway itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIdentity {
    /// The canonical identity.
    pub identity: Identity,
    /// Where it was resolved from.
    pub source: IdentitySource,
}

impl ResolvedIdentity {
    /// Whether this identity was synthesized locally.
    pub fn is_synthesized(&self) -> bool {
        self.source == IdentitySource::Synthesized
    }
}
