//! Session Credential Codec
//!
//! HS256 JWTs. The codec only parses and checks the signature; time windows
//! and identity checks belong to the validator, so a forged token is reported
//! as `signature_valid = false` instead of an error.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;
use warden_common::{EntityKind, EntityRef, SessionScope};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity id.
    pub sub: Uuid,
    /// Identity kind.
    pub knd: EntityKind,
    pub scope: SessionScope,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Session id.
    pub jti: Uuid,
    pub iss: String,
    /// Any other claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionClaims {
    #[must_use]
    pub const fn identity(&self) -> EntityRef {
        EntityRef::new(self.knd, self.sub)
    }
}

/// A decoded credential. The signature has been checked but nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCredential {
    pub claims: SessionClaims,
    pub signature_valid: bool,
}

/// Codec errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Not a token this codec can parse.
    #[error("Malformed credential")]
    Malformed,

    /// Well-formed, but minted by someone else.
    #[error("Credential issued by a foreign issuer")]
    ForeignIssuer,

    #[error("Failed to sign credential: {0}")]
    Signing(String),
}

/// Encodes and decodes session credentials.
pub trait CredentialCodec: Send + Sync {
    /// Mint a credential for `identity`.
    fn issue(
        &self,
        identity: &EntityRef,
        scope: SessionScope,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        extra: Map<String, Value>,
    ) -> Result<String, CodecError>;

    /// Parse a credential and check its signature.
    fn decode(&self, token: &str) -> Result<DecodedCredential, CodecError>;
}

/// HS256 JWT codec with a shared secret.
pub struct JwtCredentialCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
}

impl fmt::Debug for JwtCredentialCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtCredentialCodec")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtCredentialCodec {
    #[must_use]
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
        }
    }

    fn base_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry and issued-at are judged against the injected clock, not here
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        validation
    }

    /// Decode without checking the signature.
    fn decode_unverified(token: &str) -> Result<SessionClaims, CodecError> {
        let mut validation = Self::base_validation();
        validation.insecure_disable_signature_validation();

        decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|_| CodecError::Malformed)
    }
}

impl CredentialCodec for JwtCredentialCodec {
    fn issue(
        &self,
        identity: &EntityRef,
        scope: SessionScope,
        issued_at: DateTime<Utc>,
        ttl: Duration,
        extra: Map<String, Value>,
    ) -> Result<String, CodecError> {
        let claims = SessionClaims {
            sub: identity.id,
            knd: identity.kind,
            scope,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::now_v7(),
            iss: self.issuer.clone(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CodecError::Signing(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<DecodedCredential, CodecError> {
        let mut validation = Self::base_validation();
        validation.set_issuer(&[&self.issuer]);

        match decode::<SessionClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(DecodedCredential {
                claims: data.claims,
                signature_valid: true,
            }),
            Err(e) => match e.kind() {
                ErrorKind::InvalidSignature => {
                    let claims = Self::decode_unverified(token)?;
                    if claims.iss != self.issuer {
                        return Err(CodecError::ForeignIssuer);
                    }
                    Ok(DecodedCredential {
                        claims,
                        signature_valid: false,
                    })
                }
                ErrorKind::InvalidIssuer => Err(CodecError::ForeignIssuer),
                _ => Err(CodecError::Malformed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SECRET: &[u8] = b"test-secret-with-enough-entropy-0123456789";

    fn codec() -> JwtCredentialCodec {
        JwtCredentialCodec::new(SECRET, "warden")
    }

    fn issued_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_issue_then_decode_preserves_claims() {
        let alice = EntityRef::user(Uuid::now_v7());
        let mut extra = Map::new();
        extra.insert("locale".to_string(), json!("fr"));

        let token = codec()
            .issue(&alice, SessionScope::User, issued_at(), Duration::hours(1), extra)
            .unwrap();
        let decoded = codec().decode(&token).unwrap();

        assert!(decoded.signature_valid);
        assert_eq!(decoded.claims.identity(), alice);
        assert_eq!(decoded.claims.scope, SessionScope::User);
        assert_eq!(decoded.claims.iat, 1_700_000_000);
        assert_eq!(decoded.claims.exp, 1_700_003_600);
        assert_eq!(decoded.claims.extra.get("locale"), Some(&json!("fr")));
    }

    #[test]
    fn test_decode_ignores_expiry() {
        let alice = EntityRef::user(Uuid::now_v7());
        // Expired long ago by wall-clock time
        let token = codec()
            .issue(&alice, SessionScope::User, issued_at(), Duration::seconds(1), Map::new())
            .unwrap();

        assert!(codec().decode(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_reports_invalid_signature() {
        let alice = EntityRef::user(Uuid::now_v7());
        let forged = JwtCredentialCodec::new(b"some-other-secret-entirely-0000000", "warden")
            .issue(&alice, SessionScope::Admin, issued_at(), Duration::hours(1), Map::new())
            .unwrap();

        let decoded = codec().decode(&forged).unwrap();
        assert!(!decoded.signature_valid);
        assert_eq!(decoded.claims.scope, SessionScope::Admin);
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let alice = EntityRef::user(Uuid::now_v7());
        let token = JwtCredentialCodec::new(SECRET, "someone-else")
            .issue(&alice, SessionScope::User, issued_at(), Duration::hours(1), Map::new())
            .unwrap();

        assert_eq!(codec().decode(&token), Err(CodecError::ForeignIssuer));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(codec().decode("not-a-jwt"), Err(CodecError::Malformed));
        assert_eq!(codec().decode(""), Err(CodecError::Malformed));
        assert_eq!(codec().decode("a.b.c"), Err(CodecError::Malformed));
    }
}
