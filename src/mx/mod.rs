//! MX resolution adapter.
//!
//! [`resolve_mx`] turns a raw lookup into the ordered candidate list the
//! handshake stage walks through.

mod resolver;
mod types;

pub use resolver::{LookupMx, resolve_mx};
pub use types::MxCandidate;
