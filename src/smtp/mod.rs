//! SMTP probe handshake.
//!
//! [`HandshakeMachine`] holds the protocol state: the ordered step queue,
//! the response accumulator and the stage counter. [`HandshakeClient`] feeds
//! it from a socket obtained through [`Connect`] and applies the idle
//! timeout. Nothing past `RCPT TO` is ever sent except `QUIT`.

mod client;
mod state;
mod step;
mod transport;

pub use client::HandshakeClient;
pub use state::{Action, HandshakeMachine, HandshakeState};
pub use step::{HandshakeStep, handshake_steps};
pub use transport::{Connect, TcpConnector};
