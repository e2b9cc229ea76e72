use std::future::Future;

use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

use super::MxCandidate;
use crate::error::VerificationError;
use crate::types::VerificationStage;
use crate::validator::EmailAddress;

/// MX lookup primitive. Implementations return the records in resolver
/// order; an empty `Vec` means the domain has no MX records.
pub trait LookupMx {
    fn lookup_mx(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<MxCandidate>, ResolveError>> + Send;
}

impl LookupMx for TokioAsyncResolver {
    fn lookup_mx(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<MxCandidate>, ResolveError>> + Send {
        async move {
            let lookup = match self.mx_lookup(domain).await {
                Ok(lookup) => lookup,
                Err(err) if is_no_records(&err) => return Ok(Vec::new()),
                Err(err) => return Err(err),
            };
            Ok(lookup
                .iter()
                .map(|mx| {
                    MxCandidate::new(normalize_exchange(&mx.exchange().to_utf8()), mx.preference())
                })
                .collect())
        }
    }
}

fn is_no_records(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

/// Looks up the MX hosts of the address' domain and orders them by
/// ascending priority. Equal priorities keep the resolver's order.
pub async fn resolve_mx<R: LookupMx>(
    resolver: &R,
    email: &EmailAddress,
) -> Result<Vec<MxCandidate>, VerificationError> {
    let stage = VerificationStage::MX;
    let domain = email.domain();
    let mut candidates = resolver
        .lookup_mx(&domain)
        .await
        .map_err(|err| VerificationError::lookup(stage, &err))?;

    if candidates.is_empty() {
        return Err(VerificationError::no_mx_records(stage));
    }

    candidates.sort_by_key(|candidate| candidate.priority);
    Ok(candidates)
}
