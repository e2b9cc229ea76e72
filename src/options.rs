use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// How a server reply is checked against the code a handshake step requires.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyMatch {
    /// The code may appear anywhere in the accumulated reply text.
    ///
    /// Lenient: a multi-line reply mentioning `250` in its text satisfies a
    /// `250` step even if its status is something else.
    #[default]
    Substring,
    /// Some line of the reply must start with the three-digit code.
    StatusLine,
}

impl ReplyMatch {
    pub fn is_satisfied(self, reply: &str, code: u16) -> bool {
        let code = code.to_string();
        match self {
            Self::Substring => reply.contains(&code),
            Self::StatusLine => reply.lines().any(|line| {
                line.starts_with(&code)
                    && line
                        .as_bytes()
                        .get(code.len())
                        .is_none_or(|b| matches!(*b, b' ' | b'-' | b'\r'))
            }),
        }
    }
}

/// Knobs for [`Verifier`](crate::Verifier).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOptions {
    /// TCP port of the MX hosts.
    pub port: u16,
    /// Envelope sender used in `MAIL FROM`.
    pub sender: String,
    /// Idle timeout in milliseconds, `0` waits forever.
    pub timeout_ms: u64,
    /// Name announced in `EHLO`.
    pub fqdn: String,
    pub reply_match: ReplyMatch,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            port: 25,
            sender: "name@example.org".to_string(),
            timeout_ms: 0,
            fqdn: "mail.example.org".to_string(),
            reply_match: ReplyMatch::Substring,
        }
    }
}

impl VerifyOptions {
    /// Return the idle timeout as a [`Duration`]. A zero timeout disables it.
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }
}
