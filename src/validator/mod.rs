mod domain;
mod local;
mod types;

pub use types::EmailAddress;

use domain::is_domain;
use local::is_local_part;

use crate::error::VerificationError;
use crate::types::VerificationStage;

/// Structural check only: `local-part@domain`, where the domain has at
/// least one dot or is a bracketed IPv4 literal. No network access.
pub fn is_valid_syntax(email: &str) -> bool {
    // quoted local parts may contain '@', the domain never does
    match email.rsplit_once('@') {
        Some((local, domain)) => is_local_part(local) && is_domain(domain),
        None => false,
    }
}

/// Validates `email` and wraps it. Failures are reported at stage 1 with a
/// fixed message.
pub fn validate_email(email: &str) -> Result<EmailAddress, VerificationError> {
    if is_valid_syntax(email) {
        Ok(EmailAddress::new_unchecked(email))
    } else {
        Err(VerificationError::syntax(VerificationStage::SYNTAX))
    }
}
