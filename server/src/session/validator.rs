//! Session validation.
//!
//! Turns a credential into a `SessionPrincipal`. Every rejection collapses to
//! one external error; the precise reason is only logged at debug level.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use warden_common::{EntityRef, SessionScope};

use super::clock::Clock;
use super::codec::{CodecError, CredentialCodec};
use super::principal::SessionPrincipal;
use crate::db::StoreError;
use crate::entities::EntityStore;

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `Authorization: Bearer ...`
    Bearer,
    Cookie,
}

/// An opaque credential presented by a caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub source: CredentialSource,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: CredentialSource::Bearer,
        }
    }

    pub fn cookie(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: CredentialSource::Cookie,
        }
    }
}

// Keep tokens out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Why a credential was rejected. Internal only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Malformed,
    ForeignIssuer,
    Expired,
    IssuedInFuture,
    BadSignature,
    UnknownIdentity,
    InactiveIdentity,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Malformed => "malformed",
            Self::ForeignIssuer => "foreign issuer",
            Self::Expired => "expired",
            Self::IssuedInFuture => "issued in the future",
            Self::BadSignature => "signature mismatch",
            Self::UnknownIdentity => "unknown identity",
            Self::InactiveIdentity => "inactive identity",
        };
        f.write_str(reason)
    }
}

/// Session validation errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The message is identical for every reason.
    #[error("Invalid or expired session")]
    Invalid(InvalidReason),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CodecError> for InvalidReason {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::ForeignIssuer => Self::ForeignIssuer,
            CodecError::Malformed | CodecError::Signing(_) => Self::Malformed,
        }
    }
}

/// Validates session credentials against a codec, the entity registry and a clock.
#[derive(Clone)]
pub struct SessionValidator {
    codec: Arc<dyn CredentialCodec>,
    entities: Arc<dyn EntityStore>,
    clock: Arc<dyn Clock>,
    leeway: Duration,
}

impl SessionValidator {
    pub fn new(
        codec: Arc<dyn CredentialCodec>,
        entities: Arc<dyn EntityStore>,
        clock: Arc<dyn Clock>,
        leeway: Duration,
    ) -> Self {
        Self {
            codec,
            entities,
            clock,
            leeway,
        }
    }

    /// Validate a credential.
    ///
    /// Checks, in order: encoding, expiry, issued-at, signature, identity. The
    /// time window is judged even when the signature does not match.
    #[tracing::instrument(skip(self))]
    pub async fn validate(
        &self,
        credential: &Credential,
    ) -> Result<SessionPrincipal, SessionError> {
        let decoded = self
            .codec
            .decode(&credential.token)
            .map_err(|e| reject(e.into()))?;
        let claims = decoded.claims;
        let now = self.clock.now();

        if now.timestamp() >= claims.exp {
            return Err(reject(InvalidReason::Expired));
        }
        if claims.iat > (now + self.leeway).timestamp() {
            return Err(reject(InvalidReason::IssuedInFuture));
        }
        if !decoded.signature_valid {
            return Err(reject(InvalidReason::BadSignature));
        }

        let identity = claims.identity();
        match self.entities.find(&identity).await? {
            None => return Err(reject(InvalidReason::UnknownIdentity)),
            Some(entity) if !entity.active => return Err(reject(InvalidReason::InactiveIdentity)),
            Some(_) => {}
        }

        Ok(SessionPrincipal {
            identity,
            scope: claims.scope,
            issued_at: timestamp(claims.iat),
            expires_at: timestamp(claims.exp),
            session_id: claims.jti,
            claims: claims.extra,
        })
    }

    /// Mint a credential starting now, by this validator's clock.
    pub fn issue(
        &self,
        identity: &EntityRef,
        scope: SessionScope,
        ttl: Duration,
        extra: Map<String, Value>,
    ) -> Result<String, CodecError> {
        self.codec
            .issue(identity, scope, self.clock.now(), ttl, extra)
    }
}

fn reject(reason: InvalidReason) -> SessionError {
    debug!(%reason, "Session rejected");
    SessionError::Invalid(reason)
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
