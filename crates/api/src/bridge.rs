//! The request bridge: attaches the resolved identity to outbound requests.
//!
//! In production a gateway in front of the backend injects the identity
//! header itself, so the bridge sends nothing and the gateway's value is
//! authoritative. In development there is no gateway; a locally synthesized
//! identity is encoded into the same header the gateway would have used,
//! indistinguishable from the backend's perspective.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::{HeaderMap, HeaderName, HeaderValue};
use identity::{Claim, Identity, ResolvedIdentity};
use serde::{Deserialize, Serialize};

/// Header the backend recognizes as carrying the encoded principal.
pub const IDENTITY_HEADER: &str = "x-ms-client-principal";

/// Transport encoding of an identity: the JSON form of this payload,
/// base64-encoded. Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthHeaderPayload {
    /// Stable identifier of the principal.
    pub user_id: String,
    /// Mirrors the identity's display name.
    pub user_details: String,
    /// Mirrors the identity's provider.
    pub identity_provider: String,
    /// Mirrors the identity's claims.
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl From<&Identity> for AuthHeaderPayload {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            user_details: identity.display_name.clone(),
            identity_provider: identity.provider.clone(),
            claims: identity.claims.clone(),
        }
    }
}

impl AuthHeaderPayload {
    /// Decode a header value back into a payload. Returns `None` for
    /// anything that is not base64-encoded JSON of the expected shape.
    pub fn decode(encoded: &str) -> Option<Self> {
        let json = STANDARD.decode(encoded).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Fix up the identity header on an outgoing header map.
///
/// The bridge owns `x-ms-client-principal` and nothing else: caller-supplied
/// headers are left alone, while a caller-supplied value under the identity
/// header is stripped so it can never be mistaken for a gateway-injected
/// principal. Only a locally synthesized identity is encoded; a
/// provider-resolved identity or no identity at all sends nothing.
///
/// Encoding failures degrade to an unauthenticated request. The backend
/// answers those with its own 401, which is a well-defined outcome for the
/// caller, unlike aborting the request here.
pub fn apply_identity(headers: &mut HeaderMap, identity: Option<&ResolvedIdentity>) {
    let name = HeaderName::from_static(IDENTITY_HEADER);
    headers.remove(&name);

    let Some(resolved) = identity else {
        return;
    };

    if !resolved.is_synthesized() {
        return;
    }

    let payload = AuthHeaderPayload::from(&resolved.identity);

    let encoded = match serde_json::to_vec(&payload) {
        Ok(json) => STANDARD.encode(json),
        Err(e) => {
            log::warn!("failed to serialize identity payload, sending request unauthenticated: {e}");
            return;
        }
    };

    match HeaderValue::from_str(&encoded) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => {
            log::warn!("failed to build identity header value, sending request unauthenticated: {e}");
        }
    }
}
