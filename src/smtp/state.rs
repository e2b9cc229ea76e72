use std::collections::VecDeque;
use std::fmt;
use std::io;

use super::step::HandshakeStep;
use crate::error::VerificationError;
use crate::options::ReplyMatch;
use crate::types::VerificationStage;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Connecting,
    AwaitingGreeting,
    AwaitingEhlo,
    AwaitingMailFrom,
    AwaitingRcptTo,
    /// `QUIT` was sent; only the peer closing the connection is expected.
    AwaitingQuit,
    Closed,
    Failed,
}

impl HandshakeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    fn after_reply(self) -> Self {
        match self {
            Self::AwaitingGreeting => Self::AwaitingEhlo,
            Self::AwaitingEhlo => Self::AwaitingMailFrom,
            Self::AwaitingMailFrom => Self::AwaitingRcptTo,
            Self::AwaitingRcptTo => Self::AwaitingQuit,
            other => other,
        }
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "CONNECTING",
            Self::AwaitingGreeting => "AWAITING_GREETING",
            Self::AwaitingEhlo => "AWAITING_EHLO",
            Self::AwaitingMailFrom => "AWAITING_MAILFROM",
            Self::AwaitingRcptTo => "AWAITING_RCPTTO",
            Self::AwaitingQuit => "AWAITING_QUIT",
            Self::Closed => "CLOSED",
            Self::Failed => "FAILED",
        })
    }
}

/// What the I/O driver must do after feeding data to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Keep reading.
    Wait,
    /// Write this line, then keep reading.
    Send(String),
    /// Close the connection without waiting for the peer.
    Close,
}

/// Socket-free SMTP probe state machine.
///
/// Inbound bytes accumulate until the buffer ends with `\n`; each complete
/// response is checked against the head of the step queue only.
#[derive(Debug, Clone)]
pub struct HandshakeMachine {
    steps: VecDeque<HandshakeStep>,
    response: String,
    stage: VerificationStage,
    state: HandshakeState,
    error: Option<VerificationError>,
    reply_match: ReplyMatch,
}

impl HandshakeMachine {
    pub fn new(
        steps: VecDeque<HandshakeStep>,
        stage: VerificationStage,
        reply_match: ReplyMatch,
    ) -> Self {
        Self {
            steps,
            response: String::new(),
            stage,
            state: HandshakeState::Connecting,
            error: None,
            reply_match,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn stage(&self) -> VerificationStage {
        self.stage
    }

    pub fn error(&self) -> Option<&VerificationError> {
        self.error.as_ref()
    }

    pub fn on_connected(&mut self) {
        if self.state == HandshakeState::Connecting {
            self.state = HandshakeState::AwaitingGreeting;
        }
    }

    pub fn on_data(&mut self, data: &str) -> Action {
        if self.state.is_terminal() {
            return Action::Wait;
        }
        self.response.push_str(data);
        if !self.response.ends_with('\n') {
            return Action::Wait;
        }

        let response = std::mem::take(&mut self.response);
        // server's closing acknowledgment after QUIT
        let Some(step) = self.steps.pop_front() else {
            return Action::Wait;
        };

        if self.reply_match.is_satisfied(&response, step.required_code) {
            self.stage = self.stage.advance();
            self.state = self.state.after_reply();
            Action::Send(step.outbound)
        } else {
            self.fail(VerificationError::rejection(self.stage, response));
            Action::Close
        }
    }

    pub fn on_transport_error(&mut self, err: &io::Error) -> VerificationError {
        self.fail(VerificationError::transport(self.stage, err))
    }

    pub fn on_timeout(&mut self) -> VerificationError {
        self.fail(VerificationError::timeout(self.stage))
    }

    /// End of stream. Succeeds with the stage reached unless an error was
    /// recorded earlier.
    pub fn on_close(&mut self) -> Result<VerificationStage, VerificationError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => {
                self.state = HandshakeState::Closed;
                Ok(self.stage)
            }
        }
    }

    fn fail(&mut self, err: VerificationError) -> VerificationError {
        self.state = HandshakeState::Failed;
        self.error = Some(err.clone());
        err
    }
}
