/// `[d.d.d.d]` with one to three digits per group. Values are not range-checked.
pub(crate) fn is_ipv4_literal(domain: &str) -> bool {
    let Some(inner) = domain
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return false;
    };
    let groups: Vec<&str> = inner.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| (1..=3).contains(&g.len()) && g.chars().all(|c| c.is_ascii_digit()))
}

/// At least two labels of `[A-Za-z0-9-]`, the last one alphabetic and two
/// characters or more.
pub(crate) fn is_hostname(domain: &str) -> bool {
    let Some((labels, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());
    tld_ok
        && labels.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

pub(crate) fn is_domain(domain: &str) -> bool {
    is_ipv4_literal(domain) || is_hostname(domain)
}
