// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Validator identity records and the roster provider capability.
//!
//! The roster is an injected dependency rather than module-level state so
//! the resolver can be exercised against fixed fixtures.  Two providers
//! exist: [`StaticRoster`] (configured or compiled-in list, defined here)
//! and the remote provider in `zilmon-tools`, which samples the downstream
//! roster metric.  The resolver works uniformly against either.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A validator identity record.  Immutable once obtained; uniquely keyed by
/// any of its four fields, case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub name: String,
    pub public_key: String,
    pub address: String,
    pub zil_address: String,
}

impl ValidatorRecord {
    /// True when any identity field equals `identifier`, case-insensitively.
    pub fn matches(&self, identifier: &str) -> bool {
        self.name.eq_ignore_ascii_case(identifier)
            || self.public_key.eq_ignore_ascii_case(identifier)
            || self.address.eq_ignore_ascii_case(identifier)
            || self.zil_address.eq_ignore_ascii_case(identifier)
    }
}

/// Resolve a user-supplied identifier (name, public key, chain address, or
/// human-readable address) against a roster.
///
/// Returns `None` rather than an error on an empty roster or no match, so
/// callers surface a structured "validator not found" response instead of
/// propagating an exception.
pub fn resolve<'a>(identifier: &str, roster: &'a [ValidatorRecord]) -> Option<&'a ValidatorRecord> {
    roster.iter().find(|record| record.matches(identifier))
}

/// Capability for obtaining the current roster.
#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn roster(&self) -> anyhow::Result<Vec<ValidatorRecord>>;
}

/// Roster backed by a fixed list.
pub struct StaticRoster {
    validators: Vec<ValidatorRecord>,
}

impl StaticRoster {
    pub fn new(validators: Vec<ValidatorRecord>) -> Self {
        Self { validators }
    }

    /// The compiled-in mainnet roster, used when the configuration supplies
    /// no validator list of its own.
    pub fn builtin() -> Self {
        Self::new(vec![
            ValidatorRecord {
                name: "TorchWallet.io".into(),
                public_key: "0x92fa2a6fdfec43264e4a03a5b6f9f772ad99e41b6f4929cbdfcd7076d1b4f65d8b35e8b8d0a25bd7ca9e5c2f6b44d1a0".into(),
                address: "0x7a2f3e51b8c0d9a4e6f1827c5d30b94a61e8f2c7".into(),
                zil_address: "zil1og9uw2xuvpkdyu7xp97chfshy5c0glv3m4xrfr".into(),
            },
            ValidatorRecord {
                name: "Moonlet".into(),
                public_key: "0x8b1e9d4c2f6a35087be1d0923c4a5f6e8d7b2a1c09f384e5d6c7b8a9f0e1d2c3b4a5968778695a4b3c2d1e0f9a8b7c6d".into(),
                address: "0x3c8d1f7a92e4b6055da8c3197fe20d4b8a61c9e2".into(),
                zil_address: "zil1w7x8m6kfwftq2hd2xp3jlltzj69cwfu2rxkhmm".into(),
            },
            ValidatorRecord {
                name: "CEX.IO".into(),
                public_key: "0xa4c7e2d95b1f6083c2e8d4a6b9f0175e3c2d8b4a6f9e0d1c2b3a4f5e6d7c8b9a0f1e2d3c4b5a69788796a5b4c3d2e1f0".into(),
                address: "0x91b4e6d2c8f0a3571ce9d2b487a6f3e0d5c18b29".into(),
                zil_address: "zil1jx6wdjty0q5dt3e6wj6g0fk0sr2hqck2f8hxkl".into(),
            },
            ValidatorRecord {
                name: "2ZilMoon".into(),
                public_key: "0xb6d9f1a3c5e7082b4d6f8a0c2e4b6d8f0a2c4e6b8d0f2a4c6e8b0d2f4a6c8e0b2d4f6a8c0e2b4d6f8a0c2e4b6d8f0a2c".into(),
                address: "0x5e2a9c7f31d8b4068fa3e5c192d7b0f4a8c6e31d".into(),
                zil_address: "zil1tc4fcleca343q868u0zvjh4kr62xxucaxw0nyd".into(),
            },
        ])
    }
}

#[async_trait]
impl RosterProvider for StaticRoster {
    async fn roster(&self) -> anyhow::Result<Vec<ValidatorRecord>> {
        Ok(self.validators.clone())
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<ValidatorRecord> {
        vec![
            ValidatorRecord {
                name: "TorchWallet.io".into(),
                public_key: "0xAA11".into(),
                address: "0xdead".into(),
                zil_address: "zil1aaa".into(),
            },
            ValidatorRecord {
                name: "Moonlet".into(),
                public_key: "0xBB22".into(),
                address: "0xbeef".into(),
                zil_address: "zil1bbb".into(),
            },
        ]
    }

    #[test]
    fn resolve_by_name() {
        let roster = fixture();
        let found = resolve("TorchWallet.io", &roster).unwrap();
        assert_eq!(found.public_key, "0xAA11");
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let roster = fixture();
        let upper = resolve("TORCHWALLET.IO", &roster).unwrap();
        let canonical = resolve("TorchWallet.io", &roster).unwrap();
        assert_eq!(upper, canonical);
    }

    #[test]
    fn resolve_by_public_key_and_addresses() {
        let roster = fixture();
        assert_eq!(resolve("0xbb22", &roster).unwrap().name, "Moonlet");
        assert_eq!(resolve("0xBEEF", &roster).unwrap().name, "Moonlet");
        assert_eq!(resolve("ZIL1AAA", &roster).unwrap().name, "TorchWallet.io");
    }

    #[test]
    fn resolve_unknown_returns_none() {
        assert!(resolve("nobody", &fixture()).is_none());
    }

    #[test]
    fn resolve_empty_roster_returns_none() {
        assert!(resolve("TorchWallet.io", &[]).is_none());
    }

    #[tokio::test]
    async fn static_roster_returns_configured_list() {
        let provider = StaticRoster::new(fixture());
        let roster = provider.roster().await.unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[tokio::test]
    async fn builtin_roster_is_resolvable() {
        let provider = StaticRoster::builtin();
        let roster = provider.roster().await.unwrap();
        assert!(resolve("torchwallet.io", &roster).is_some());
    }
}
