//! Signed, stateless links. A capability token binds one appointment, one
//! viewer identity and one expiry; the simpler hash link protects the
//! accept/decline actions, which are self-terminating and therefore need
//! neither expiry nor subject binding.
//!
//! Verification is pure: no database lookup and no revocation list. A
//! leaked, unexpired link cannot be invalidated early; expiry is the only
//! defense, so issuers keep expiries short.

use crate::shared::entity::ID;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_SEPARATOR: char = '.';

/// Payload of a capability token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityClaims {
    pub event_id: ID,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Payload of an accept/decline hash link, carried URL-encoded in the
/// `data` query parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload {
    pub event_id: ID,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum CapabilityError {
    /// Malformed and tampered tokens are deliberately indistinguishable.
    #[error("Invalid token")]
    Invalid,
    /// A token for appointment A must never authorize an action on B.
    #[error("Token does not match event")]
    EventMismatch,
    #[error("Token expired")]
    Expired,
}

pub struct CapabilityCodec {
    secret: Vec<u8>,
}

impl CapabilityCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    /// Serializes and signs the claims into an opaque token string:
    /// `base64url(payload json) + "." + base64url(mac)`.
    pub fn issue(&self, claims: &CapabilityClaims) -> String {
        let payload =
            serde_json::to_vec(claims).expect("capability claims always serialize to JSON");
        let signature = self.mac(&payload);
        format!(
            "{}{}{}",
            URL_SAFE_NO_PAD.encode(&payload),
            TOKEN_SEPARATOR,
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Recomputes the MAC over the decoded payload bytes and checks, in
    /// order: signature, event binding, expiry.
    pub fn verify(
        &self,
        token: &str,
        expected_event_id: &ID,
        now: DateTime<Utc>,
    ) -> Result<CapabilityClaims, CapabilityError> {
        let (payload_b64, signature_b64) = token
            .split_once(TOKEN_SEPARATOR)
            .ok_or(CapabilityError::Invalid)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CapabilityError::Invalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| CapabilityError::Invalid)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(&payload);
        // Constant-time comparison.
        mac.verify_slice(&signature)
            .map_err(|_| CapabilityError::Invalid)?;

        let claims: CapabilityClaims =
            serde_json::from_slice(&payload).map_err(|_| CapabilityError::Invalid)?;

        if claims.event_id != *expected_event_id {
            return Err(CapabilityError::EventMismatch);
        }
        if now > claims.expires_at {
            return Err(CapabilityError::Expired);
        }

        Ok(claims)
    }

    /// MAC for a hash link, computed over the payload string byte-for-byte.
    pub fn sign_link_payload(&self, payload: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes()))
    }

    /// Recomputes and compares the hash-link MAC in constant time.
    pub fn verify_link_payload(&self, payload: &str, key: &str) -> bool {
        let Ok(signature) = URL_SAFE_NO_PAD.decode(key) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).is_ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    fn codec() -> CapabilityCodec {
        CapabilityCodec::new("test-link-secret")
    }

    fn claims(event_id: &ID, expires_at: DateTime<Utc>) -> CapabilityClaims {
        CapabilityClaims {
            event_id: event_id.clone(),
            email: "jane@example.com".into(),
            expires_at,
        }
    }

    #[test]
    fn issued_tokens_round_trip() {
        let codec = codec();
        let event_id = ID::new();
        let now = Utc::now();
        let issued = claims(&event_id, now + Duration::days(7));

        let token = codec.issue(&issued);
        let verified = codec.verify(&token, &event_id, now).unwrap();
        assert_eq!(verified.email, issued.email);
        assert_eq!(verified.expires_at, issued.expires_at);
        assert_eq!(verified.event_id, event_id);
    }

    #[test]
    fn token_for_one_event_never_authorizes_another() {
        let codec = codec();
        let event_id = ID::new();
        let other_event = ID::new();
        let now = Utc::now();

        let token = codec.issue(&claims(&event_id, now + Duration::days(7)));
        assert_eq!(
            codec.verify(&token, &other_event, now),
            Err(CapabilityError::EventMismatch)
        );
    }

    #[test]
    fn expired_tokens_are_rejected_with_a_distinct_error() {
        let codec = codec();
        let event_id = ID::new();
        let now = Utc::now();

        let token = codec.issue(&claims(&event_id, now - Duration::minutes(1)));
        assert_eq!(
            codec.verify(&token, &event_id, now),
            Err(CapabilityError::Expired)
        );
    }

    #[test]
    fn expiry_is_checked_after_event_binding() {
        let codec = codec();
        let event_id = ID::new();
        let other_event = ID::new();
        let now = Utc::now();

        let token = codec.issue(&claims(&event_id, now - Duration::minutes(1)));
        assert_eq!(
            codec.verify(&token, &other_event, now),
            Err(CapabilityError::EventMismatch)
        );
    }

    #[test]
    fn any_single_character_signature_mutation_invalidates() {
        let codec = codec();
        let event_id = ID::new();
        let now = Utc::now();
        let token = codec.issue(&claims(&event_id, now + Duration::days(7)));

        let (payload, signature) = token.split_once('.').unwrap();
        for (i, c) in signature.char_indices() {
            let replacement = if c == 'A' { 'B' } else { 'A' };
            let mut mutated = signature.to_string();
            mutated.replace_range(i..i + c.len_utf8(), &replacement.to_string());
            let mutated_token = format!("{}.{}", payload, mutated);
            assert_eq!(
                codec.verify(&mutated_token, &event_id, now),
                Err(CapabilityError::Invalid)
            );
        }
    }

    #[test]
    fn payload_tampering_invalidates() {
        let codec = codec();
        let event_id = ID::new();
        let other_event = ID::new();
        let now = Utc::now();
        let token = codec.issue(&claims(&event_id, now + Duration::days(7)));

        let (_, signature) = token.split_once('.').unwrap();
        let forged_payload = serde_json::to_vec(&claims(&other_event, now + Duration::days(7)))
            .unwrap();
        let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode(forged_payload), signature);
        assert_eq!(
            codec.verify(&forged, &event_id, now),
            Err(CapabilityError::Invalid)
        );
    }

    #[test]
    fn malformed_tokens_are_rejected_like_tampered_ones() {
        let codec = codec();
        let event_id = ID::new();
        let now = Utc::now();

        for garbage in ["", "no-separator", "a.b", "!!!.???", "onlypayload."] {
            assert_eq!(
                codec.verify(garbage, &event_id, now),
                Err(CapabilityError::Invalid)
            );
        }
    }

    #[test]
    fn tokens_from_a_different_secret_are_invalid() {
        let event_id = ID::new();
        let now = Utc::now();
        let token =
            CapabilityCodec::new("secret-a").issue(&claims(&event_id, now + Duration::days(1)));
        assert_eq!(
            CapabilityCodec::new("secret-b").verify(&token, &event_id, now),
            Err(CapabilityError::Invalid)
        );
    }

    #[test]
    fn hash_links_round_trip_and_reject_mutation() {
        let codec = codec();
        let payload = r#"{"eventId":"evt-1","email":"jane@example.com"}"#;
        let key = codec.sign_link_payload(payload);

        assert!(codec.verify_link_payload(payload, &key));
        assert!(!codec.verify_link_payload(payload, "bogus-key"));

        let other_payload = r#"{"eventId":"evt-2","email":"jane@example.com"}"#;
        assert!(!codec.verify_link_payload(other_payload, &key));
    }

    #[test]
    fn expires_at_is_serialized_as_iso8601() {
        let codec = codec();
        let event_id = ID::new();
        let now = Utc::now();
        let token = codec.issue(&claims(&event_id, now + Duration::days(1)));

        let (payload_b64, _) = token.split_once('.').unwrap();
        let payload = URL_SAFE_NO_PAD.decode(payload_b64).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        let expires_at = json["expiresAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(expires_at).is_ok());
    }
}
