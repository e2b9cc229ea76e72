#![forbid(unsafe_code)]
//! mailverify_lib: e-mail existence probe (syntax, MX, SMTP handshake)

pub mod error;
pub mod logger;
pub mod mx;
pub mod options;
pub mod smtp;
pub mod types;
pub mod validator;
mod verifier;

#[cfg(test)]
mod testing;

pub use error::{
    ErrorCode, FailureKind, InputError, SERVICE_UNAVAILABLE, TIMEOUT_MESSAGE, VerificationError,
};
pub use logger::{NoopLogger, SharedLogger, TracingLogger, VerificationLogger, tracing_logger};
pub use mx::{LookupMx, MxCandidate, resolve_mx};
pub use options::{ReplyMatch, VerifyOptions};
pub use smtp::{Connect, HandshakeClient, HandshakeMachine, HandshakeState, TcpConnector};
pub use types::{VerificationResult, VerificationStage};
pub use validator::{EmailAddress, is_valid_syntax, validate_email};
pub use verifier::Verifier;
