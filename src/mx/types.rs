/// One mail exchange for a domain. Lower `priority` is preferred.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MxCandidate {
    pub host: String,
    pub priority: u16,
}

impl MxCandidate {
    pub fn new(host: impl Into<String>, priority: u16) -> Self {
        Self {
            host: host.into(),
            priority,
        }
    }
}
