use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::state::{Action, HandshakeMachine, HandshakeState};
use super::step::handshake_steps;
use super::transport::Connect;
use crate::error::VerificationError;
use crate::logger::VerificationLogger;
use crate::mx::MxCandidate;
use crate::options::VerifyOptions;
use crate::types::VerificationStage;
use crate::validator::EmailAddress;

const READ_CHUNK: usize = 1024;

/// Drives a [`HandshakeMachine`] over one connection to one MX host.
///
/// A client makes a single pass and never retries; trying another host is
/// up to the caller, with a fresh client.
pub struct HandshakeClient<'a> {
    candidate: &'a MxCandidate,
    port: u16,
    timeout: Option<Duration>,
    machine: HandshakeMachine,
    logger: &'a dyn VerificationLogger,
}

impl<'a> HandshakeClient<'a> {
    pub fn new(
        options: &VerifyOptions,
        email: &EmailAddress,
        candidate: &'a MxCandidate,
        stage: VerificationStage,
        logger: &'a dyn VerificationLogger,
    ) -> Self {
        let steps = handshake_steps(&options.fqdn, &options.sender, email.as_str());
        Self {
            candidate,
            port: options.port,
            timeout: options.timeout(),
            machine: HandshakeMachine::new(steps, stage, options.reply_match),
            logger,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.machine.state()
    }

    pub fn stage(&self) -> VerificationStage {
        self.machine.stage()
    }

    /// Connects and runs the probe dialogue until the peer closes the
    /// connection, a reply is rejected, the transport fails or the idle
    /// timer fires.
    pub async fn run<C: Connect>(
        &mut self,
        connector: &C,
    ) -> Result<VerificationStage, VerificationError> {
        if self.machine.state().is_terminal() {
            return self.machine.on_close();
        }

        let candidate: &'a MxCandidate = self.candidate;
        self.logger.info(&format!(
            "Creating connection to '{}' with priority '{}'",
            candidate.host, candidate.priority
        ));

        let connect = connector.connect(&candidate.host, self.port);
        let mut stream = match idle(self.timeout, connect).await {
            Some(Ok(stream)) => stream,
            Some(Err(err)) => return Err(self.transport_failure(&err)),
            None => return Err(self.timed_out()),
        };
        self.machine.on_connected();
        self.logger.info("Connected");

        let mut buf = [0u8; READ_CHUNK];
        loop {
            let read = match idle(self.timeout, stream.read(&mut buf)).await {
                Some(read) => read,
                None => {
                    drop(stream);
                    return Err(self.timed_out());
                }
            };
            let len = match read {
                Ok(0) => {
                    self.logger.info("Closing connection");
                    return self.machine.on_close();
                }
                Ok(len) => len,
                Err(err) => return Err(self.transport_failure(&err)),
            };

            let data = String::from_utf8_lossy(&buf[..len]);
            self.logger.server(&data);
            match self.machine.on_data(&data) {
                Action::Wait => {}
                Action::Send(line) => {
                    self.logger.info(&format!("stage={}", self.machine.stage()));
                    self.logger.client(&line);
                    if let Err(err) = write_line(&mut stream, &line).await {
                        return Err(self.transport_failure(&err));
                    }
                }
                Action::Close => {
                    match idle(self.timeout, stream.shutdown()).await {
                        Some(Ok(())) => {}
                        Some(Err(err)) => self
                            .logger
                            .error(&format!("{}: shutdown failed: {err}", candidate.host)),
                        None => self
                            .logger
                            .error(&format!("{}: shutdown timed out", candidate.host)),
                    }
                    drop(stream);
                    self.logger.info("Closing connection");
                    return self.machine.on_close();
                }
            }
        }
    }

    fn transport_failure(&mut self, err: &io::Error) -> VerificationError {
        self.logger.error(&format!("{}: {err}", self.candidate.host));
        self.machine.on_transport_error(err)
    }

    fn timed_out(&mut self) -> VerificationError {
        self.logger
            .error(&format!("{}: idle timeout, connection destroyed", self.candidate.host));
        self.machine.on_timeout()
    }
}

/// `None` when the idle timer fired first.
async fn idle<F: Future>(timeout: Option<Duration>, fut: F) -> Option<F::Output> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

async fn write_line<S: AsyncWrite + Unpin>(stream: &mut S, line: &str) -> io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.flush().await
}
