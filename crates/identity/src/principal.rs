//! Decoding of authentication status responses.
//!
//! Different authentication backends wrap the principal differently. The
//! decoder attempts each known shape in a fixed priority order; every
//! attempt either claims the body or passes it to the next shape, so the
//! normalization stays exhaustive without scattered conditionals.

use serde::Deserialize;
use serde_json::Value;

use crate::{Claim, Identity};

/// Raw provider-specific principal record, before normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrincipal {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    user_details: Option<String>,
    #[serde(default)]
    identity_provider: Option<String>,
    #[serde(default)]
    claims: Vec<Claim>,
}

impl RawPrincipal {
    fn normalize(self) -> Option<Identity> {
        if self.user_id.is_empty() {
            return None;
        }

        Some(Identity {
            user_id: self.user_id,
            display_name: self.user_details.unwrap_or_else(|| "Unknown User".to_string()),
            provider: self.identity_provider.unwrap_or_else(|| "unknown".to_string()),
            claims: self.claims,
        })
    }
}

/// Outcome of attempting one known response shape.
enum Shape {
    /// The body is this shape. The contained principal may still be absent,
    /// which is a definitive "not logged in" rather than a reason to try
    /// further shapes.
    Match(Option<Identity>),
    /// The body is not this shape.
    NoMatch,
}

/// Decode an authentication status body into a canonical identity.
///
/// Returns `None` when no shape matches or the matched shape carries no
/// principal.
pub(crate) fn decode(body: &Value) -> Option<Identity> {
    let attempts: [fn(&Value) -> Shape; 3] = [wrapped, listed, bare];

    for attempt in attempts {
        if let Shape::Match(identity) = attempt(body) {
            return identity;
        }
    }

    None
}

/// Shape (i): an object with a `clientPrincipal` field that may be null.
fn wrapped(body: &Value) -> Shape {
    let Some(principal) = body.as_object().and_then(|object| object.get("clientPrincipal")) else {
        return Shape::NoMatch;
    };

    if principal.is_null() {
        return Shape::Match(None);
    }

    Shape::Match(parse(principal))
}

/// Shape (ii): an ordered sequence whose first element is the principal.
fn listed(body: &Value) -> Shape {
    match body.as_array() {
        Some(entries) => Shape::Match(entries.first().and_then(parse)),
        None => Shape::NoMatch,
    }
}

/// Shape (iii): a bare principal object, identifiable by a non-empty user id.
fn bare(body: &Value) -> Shape {
    match parse(body) {
        Some(identity) => Shape::Match(Some(identity)),
        None => Shape::NoMatch,
    }
}

fn parse(value: &Value) -> Option<Identity> {
    RawPrincipal::deserialize(value).ok().and_then(RawPrincipal::normalize)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::decode;
    use crate::Claim;

    fn principal() -> serde_json::Value {
        json!({
            "userId": "user-42",
            "userDetails": "Ada Lovelace",
            "identityProvider": "github",
            "claims": [
                { "type": "name", "value": "Ada Lovelace" },
                { "type": "preferred_username", "value": "ada@example.com" }
            ]
        })
    }

    #[test]
    fn all_three_shapes_decode_to_the_same_identity() {
        let wrapped = decode(&json!({ "clientPrincipal": principal() })).unwrap();
        let listed = decode(&json!([principal()])).unwrap();
        let bare = decode(&principal()).unwrap();

        assert_eq!(wrapped, listed);
        assert_eq!(listed, bare);
        assert_eq!(bare.user_id, "user-42");
        assert_eq!(bare.display_name, "Ada Lovelace");
        assert_eq!(bare.provider, "github");
        assert_eq!(bare.claims[0], Claim::new("name", "Ada Lovelace"));
    }

    #[test]
    fn null_principal_is_unauthenticated_without_falling_through() {
        assert_eq!(decode(&json!({ "clientPrincipal": null })), None);
    }

    #[test]
    fn empty_user_id_never_becomes_an_identity() {
        assert_eq!(decode(&json!({ "userId": "" })), None);
        assert_eq!(decode(&json!({ "clientPrincipal": { "userId": "" } })), None);
        assert_eq!(decode(&json!([{ "userId": "" }])), None);
    }

    #[test]
    fn missing_details_fall_back_to_placeholders() {
        let identity = decode(&json!({ "userId": "user-42" })).unwrap();

        assert_eq!(identity.display_name, "Unknown User");
        assert_eq!(identity.provider, "unknown");
        assert!(identity.claims.is_empty());
    }

    #[test]
    fn unrecognized_bodies_decode_to_none() {
        assert_eq!(decode(&json!(null)), None);
        assert_eq!(decode(&json!("nope")), None);
        assert_eq!(decode(&json!({ "unrelated": true })), None);
        assert_eq!(decode(&json!([])), None);
    }

    #[test]
    fn claim_order_is_preserved() {
        let identity = decode(&principal()).unwrap();
        let types: Vec<_> = identity.claims.iter().map(|c| c.claim_type.as_str()).collect();

        assert_eq!(types, ["name", "preferred_username"]);
    }
}
