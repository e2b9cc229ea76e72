//! Verification pipeline: syntax -> MX -> SMTP handshake, with host fallback.
//!
//! The public entry point is [`Verifier::verify`]. Every domain failure is
//! folded into a [`VerificationResult`]; only API misuse ([`InputError`])
//! comes back as `Err`.

use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::ResolveError;

use crate::error::{InputError, VerificationError};
use crate::logger::{SharedLogger, tracing_logger};
use crate::mx::{LookupMx, MxCandidate, resolve_mx};
use crate::options::VerifyOptions;
use crate::smtp::{Connect, HandshakeClient, TcpConnector};
use crate::types::{VerificationResult, VerificationStage};
use crate::validator::{EmailAddress, validate_email};

pub struct Verifier<R = TokioAsyncResolver, C = TcpConnector> {
    options: VerifyOptions,
    resolver: R,
    connector: C,
    logger: SharedLogger,
}

impl Verifier {
    /// System resolver, plain TCP and `tracing` output.
    pub fn from_system_conf(options: VerifyOptions) -> Result<Self, ResolveError> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()?;
        Ok(Self::new(options, resolver, TcpConnector))
    }
}

impl<R: LookupMx, C: Connect> Verifier<R, C> {
    pub fn new(options: VerifyOptions, resolver: R, connector: C) -> Self {
        Self {
            options,
            resolver,
            connector,
            logger: tracing_logger(),
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verifies one address. All state is rebuilt per call.
    pub async fn verify(&self, email: &str) -> Result<VerificationResult, InputError> {
        if email.is_empty() {
            return Err(InputError::Empty);
        }
        self.logger.info(&format!("# Verifying {email}"));
        self.logger
            .info(&format!("Verification options: {:?}", self.options));

        match self.run_pipeline(email).await {
            Ok(()) => Ok(VerificationResult::verified(email)),
            Err(err) => {
                self.logger.error(&err.to_string());
                Ok(VerificationResult::failed(email, &err))
            }
        }
    }

    async fn run_pipeline(&self, email: &str) -> Result<(), VerificationError> {
        let address = validate_email(email)?;
        let candidates = resolve_mx(&self.resolver, &address).await?;
        self.logger.info(&format!(
            "MX Records: {}",
            candidates
                .iter()
                .map(|c| format!("{} ({})", c.host, c.priority))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        self.try_candidates(&address, &candidates).await
    }

    /// Walks the candidates in order. Stops on the first success or the
    /// first non-transient failure; a `421` moves on to the next host.
    async fn try_candidates(
        &self,
        address: &EmailAddress,
        candidates: &[MxCandidate],
    ) -> Result<(), VerificationError> {
        let mut last_error = None;
        for candidate in candidates {
            let mut client = HandshakeClient::new(
                &self.options,
                address,
                candidate,
                VerificationStage::SMTP,
                self.logger.as_ref(),
            );
            match client.run(&self.connector).await {
                Ok(_) => return Ok(()),
                Err(err) if err.is_transient() => {
                    self.logger.info(&format!(
                        "'{}' temporarily unavailable, trying next MX host",
                        candidate.host
                    ));
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(last_error.unwrap_or_else(|| VerificationError::no_mx_records(VerificationStage::MX)))
    }
}
