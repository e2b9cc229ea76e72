//! Injected logging capability.
//!
//! The pipeline never writes output on its own: it reports informational
//! and error events plus the raw protocol traffic to a [`VerificationLogger`].
//! [`TracingLogger`] forwards everything to `tracing`; [`NoopLogger`] drops it.

use std::sync::Arc;

const TARGET: &str = "mailverify";
const SMTP_TARGET: &str = "mailverify::smtp";

pub trait VerificationLogger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    /// Raw data received from the SMTP server.
    fn server(&self, data: &str);
    /// Raw line written to the SMTP server.
    fn client(&self, line: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl VerificationLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: TARGET, "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: TARGET, "{message}");
    }

    fn server(&self, data: &str) {
        tracing::debug!(target: SMTP_TARGET, "S: {}", data.trim_end());
    }

    fn client(&self, line: &str) {
        tracing::debug!(target: SMTP_TARGET, "C: {}", line.trim_end());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl VerificationLogger for NoopLogger {
    fn info(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn server(&self, _data: &str) {}
    fn client(&self, _line: &str) {}
}

pub type SharedLogger = Arc<dyn VerificationLogger>;

pub fn tracing_logger() -> SharedLogger {
    Arc::new(TracingLogger)
}
