//! Account identities.
//!
//! The core never authenticates anyone. Signature checks and access
//! control belong to the host. An [`AccountId`] is just an opaque,
//! comparable key for a share position or a custodial balance.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DEAD_SINK_ADDRESS;

/// Opaque identity of a share holder, payer, receiver, or fee recipient.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wraps an address string. No format is imposed.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The sink that holds dead shares under the dead-share policy.
    pub fn dead_sink() -> Self {
        Self(DEAD_SINK_ADDRESS.to_string())
    }

    /// Returns the underlying address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty (or all-whitespace) identity.
    pub fn is_null(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns `true` if this is the dead-share sink.
    pub fn is_dead_sink(&self) -> bool {
        self.0 == DEAD_SINK_ADDRESS
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_detection() {
        assert!(AccountId::new("").is_null());
        assert!(AccountId::new("   ").is_null());
        assert!(!AccountId::new("alice").is_null());
    }

    #[test]
    fn dead_sink_is_recognised() {
        assert!(AccountId::dead_sink().is_dead_sink());
        assert!(!AccountId::new("alice").is_dead_sink());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = AccountId::new("tessera:alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"tessera:alice\"");
    }
}
