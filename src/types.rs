use std::fmt;

use crate::error::VerificationError;

/// How far a verification run progressed.
///
/// `0` not started, `1` syntax checked, `2` MX resolved, `3` SMTP handshake
/// attempted; every reply matched during the handshake adds one more.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(transparent))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerificationStage(u8);

impl VerificationStage {
    pub const NOT_STARTED: Self = Self(0);
    pub const SYNTAX: Self = Self(1);
    pub const MX: Self = Self(2);
    pub const SMTP: Self = Self(3);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Next checkpoint. Stages never go backwards within a run.
    #[must_use]
    pub const fn advance(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of [`Verifier::verify`](crate::Verifier::verify).
///
/// `stage` and `message` are only present when `verified` is `false`.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub email: String,
    pub verified: bool,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub stage: Option<VerificationStage>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub message: Option<String>,
}

impl VerificationResult {
    pub fn verified(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            verified: true,
            stage: None,
            message: None,
        }
    }

    pub fn failed(email: impl Into<String>, err: &VerificationError) -> Self {
        Self {
            email: email.into(),
            verified: false,
            stage: Some(err.stage()),
            message: Some(err.message().to_string()),
        }
    }
}
