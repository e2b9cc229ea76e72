use std::borrow::Cow;
use std::fmt;
use std::io;

use thiserror::Error;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;

use crate::types::VerificationStage;

/// SMTP reply code signalling "service not available, try later".
pub const SERVICE_UNAVAILABLE: u16 = 421;

/// Message recorded when the idle timer fires.
pub const TIMEOUT_MESSAGE: &str = "Connection was closed by peer";

/// Misuse of the verification API. Never converted into a
/// [`VerificationResult`](crate::VerificationResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Empty email")]
    Empty,
}

/// Machine-readable code attached to a [`VerificationError`].
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Numeric SMTP reply code (only `421` is produced today).
    Reply(u16),
    /// Symbolic transport or DNS code, e.g. `ECONNREFUSED`, `ENOTFOUND`.
    Symbol(Cow<'static, str>),
}

impl ErrorCode {
    pub const NOT_FOUND: Self = Self::Symbol(Cow::Borrowed("ENOTFOUND"));

    pub fn symbol(code: &'static str) -> Self {
        Self::Symbol(Cow::Borrowed(code))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply(code) => write!(f, "{code}"),
            Self::Symbol(code) => f.write_str(code),
        }
    }
}

/// Where in the pipeline a [`VerificationError`] comes from.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The address did not match the structural grammar (stage 1).
    Syntax,
    /// MX lookup failed or returned nothing (stage 2).
    Resolution,
    /// A required reply code was absent; the message is the server's reply.
    ProtocolRejection,
    /// Connect, reset or write failure reported by the socket.
    Transport,
    /// The idle timer fired (code `421`).
    Timeout,
}

/// A domain failure raised at the first definitive problem of a run.
///
/// The orchestrator turns these into `verified: false` results; anything
/// else (see [`InputError`]) propagates to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (stage {stage})")]
pub struct VerificationError {
    stage: VerificationStage,
    kind: FailureKind,
    message: String,
    code: Option<ErrorCode>,
}

impl VerificationError {
    pub fn new(
        stage: VerificationStage,
        kind: FailureKind,
        message: impl Into<String>,
        code: Option<ErrorCode>,
    ) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
            code,
        }
    }

    pub(crate) fn syntax(stage: VerificationStage) -> Self {
        Self::new(stage, FailureKind::Syntax, "Invalid email structure", None)
    }

    pub(crate) fn no_mx_records(stage: VerificationStage) -> Self {
        Self::new(
            stage,
            FailureKind::Resolution,
            "No MX Records",
            Some(ErrorCode::NOT_FOUND),
        )
    }

    pub(crate) fn lookup(stage: VerificationStage, err: &ResolveError) -> Self {
        Self::new(
            stage,
            FailureKind::Resolution,
            err.to_string(),
            dns_error_code(err),
        )
    }

    pub(crate) fn rejection(stage: VerificationStage, reply: impl Into<String>) -> Self {
        Self::new(stage, FailureKind::ProtocolRejection, reply, None)
    }

    pub(crate) fn transport(stage: VerificationStage, err: &io::Error) -> Self {
        Self::new(
            stage,
            FailureKind::Transport,
            err.to_string(),
            io_error_code(err),
        )
    }

    pub(crate) fn timeout(stage: VerificationStage) -> Self {
        Self::new(
            stage,
            FailureKind::Timeout,
            TIMEOUT_MESSAGE,
            Some(ErrorCode::Reply(SERVICE_UNAVAILABLE)),
        )
    }

    pub fn stage(&self) -> VerificationStage {
        self.stage
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    /// `true` when another MX host is worth trying.
    pub fn is_transient(&self) -> bool {
        matches!(self.code, Some(ErrorCode::Reply(SERVICE_UNAVAILABLE)))
    }
}

fn io_error_code(err: &io::Error) -> Option<ErrorCode> {
    let code = match err.kind() {
        io::ErrorKind::ConnectionRefused => "ECONNREFUSED",
        io::ErrorKind::ConnectionReset => "ECONNRESET",
        io::ErrorKind::ConnectionAborted => "ECONNABORTED",
        io::ErrorKind::NotConnected => "ENOTCONN",
        io::ErrorKind::AddrNotAvailable => "EADDRNOTAVAIL",
        io::ErrorKind::HostUnreachable => "EHOSTUNREACH",
        io::ErrorKind::NetworkUnreachable => "ENETUNREACH",
        io::ErrorKind::TimedOut => "ETIMEDOUT",
        io::ErrorKind::BrokenPipe => "EPIPE",
        _ => return None,
    };
    Some(ErrorCode::symbol(code))
}

fn dns_error_code(err: &ResolveError) -> Option<ErrorCode> {
    let code = match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::ServFail => "ESERVFAIL",
            ResponseCode::Refused => "EREFUSED",
            _ => "ENOTFOUND",
        },
        ResolveErrorKind::Timeout => "ETIMEOUT",
        ResolveErrorKind::NoConnections => "ECONNREFUSED",
        ResolveErrorKind::Io(io) => return io_error_code(io),
        _ => return None,
    };
    Some(ErrorCode::symbol(code))
}
