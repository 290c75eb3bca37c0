//! Session credentials.
//!
//! Decoding, signing and validation of session tokens.

pub mod clock;
pub mod codec;
mod principal;
mod validator;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{CodecError, CredentialCodec, DecodedCredential, JwtCredentialCodec, SessionClaims};
pub use principal::SessionPrincipal;
pub use validator::{Credential, CredentialSource, InvalidReason, SessionError, SessionValidator};
