use std::cmp::Ordering;
use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::types::ChannelKey;

/// Channel policy compiled into the binary.
static POLICY_YAML: &str = include_str!("../../policy/channels.yaml");

/// Deployment-time channel policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelPolicy {
    #[serde(default)]
    pub protected: Vec<ChannelKey>,
}

impl ChannelPolicy {
    pub fn embedded() -> Result<Self> {
        Self::parse(POLICY_YAML).context("Embedded channel policy is invalid")
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/**
    The fixed set of channels that require a passcode unlock.

    Built once at startup and shared read-only; there is no way to add or
    remove a channel at runtime.
*/
#[derive(Debug, Clone)]
pub struct ProtectedChannels {
    keys: HashSet<ChannelKey>,
}

impl ProtectedChannels {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ChannelKey>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .filter(|key: &ChannelKey| !key.is_empty())
                .collect(),
        }
    }

    pub fn from_policy(policy: &ChannelPolicy) -> Self {
        Self::new(&policy.protected)
    }

    /// Whether a channel needs proof before its real stream is served.
    /// Unknown ids are open.
    pub fn is_protected(&self, id: impl Into<ChannelKey>) -> bool {
        self.keys.contains(&id.into())
    }

    /// Owned, ordered copy of the set for display.
    pub fn list(&self) -> Vec<String> {
        let mut keys: Vec<&ChannelKey> = self.keys.iter().collect();
        keys.sort_by(|a, b| display_order(a, b));
        keys.into_iter().map(|k| k.as_str().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

// Numeric keys first in numeric order, then everything else lexically.
fn display_order(a: &ChannelKey, b: &ChannelKey) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.as_str().cmp(b.as_str()),
    }
}
