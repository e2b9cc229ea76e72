use std::collections::VecDeque;

/// A reply code to wait for, and the line to send once it shows up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeStep {
    pub required_code: u16,
    pub outbound: String,
}

impl HandshakeStep {
    pub fn new(required_code: u16, outbound: impl Into<String>) -> Self {
        Self {
            required_code,
            outbound: outbound.into(),
        }
    }
}

/// The fixed probe sequence: greeting `220` -> `EHLO`, `250` -> `MAIL FROM`,
/// `250` -> `RCPT TO`, `250` -> `QUIT`.
pub fn handshake_steps(fqdn: &str, sender: &str, email: &str) -> VecDeque<HandshakeStep> {
    VecDeque::from([
        HandshakeStep::new(220, format!("EHLO {fqdn}\r\n")),
        HandshakeStep::new(250, format!("MAIL FROM:<{sender}>\r\n")),
        HandshakeStep::new(250, format!("RCPT TO:<{email}>\r\n")),
        HandshakeStep::new(250, "QUIT\r\n"),
    ])
}
