//! HTTP status partitioning for Tibber API responses.
//!
//! The sets are plain configuration data so operators can extend them without
//! touching the classification logic. They must be pairwise disjoint; overlap
//! is rejected when the policy is built.

use super::errors::PolicyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which branch of the classifier a status code falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Retriable,
    Fatal,
    Unhandled,
}

/// Raw, unvalidated status sets as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPolicyConfig {
    pub ok: BTreeSet<u16>,
    pub retriable: BTreeSet<u16>,
    pub fatal: BTreeSet<u16>,
    /// Fatal statuses that mean "unauthorized" even when the body carries no code.
    pub unauthorized: BTreeSet<u16>,
}

impl Default for StatusPolicyConfig {
    fn default() -> Self {
        Self {
            ok: BTreeSet::from([200]),
            retriable: BTreeSet::from([428, 429, 500, 502, 503, 504]),
            fatal: BTreeSet::from([400, 401, 403, 404]),
            unauthorized: BTreeSet::from([401]),
        }
    }
}

/// Validated status policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
    ok: BTreeSet<u16>,
    retriable: BTreeSet<u16>,
    fatal: BTreeSet<u16>,
    unauthorized: BTreeSet<u16>,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        let StatusPolicyConfig {
            ok,
            retriable,
            fatal,
            unauthorized,
        } = StatusPolicyConfig::default();
        Self {
            ok,
            retriable,
            fatal,
            unauthorized,
        }
    }
}

impl StatusPolicy {
    pub fn new(config: StatusPolicyConfig) -> Result<Self, PolicyError> {
        let StatusPolicyConfig {
            ok,
            retriable,
            fatal,
            unauthorized,
        } = config;

        if let Some(&code) = ok
            .iter()
            .chain(&retriable)
            .chain(&fatal)
            .chain(&unauthorized)
            .find(|code| !(100..=599).contains(*code))
        {
            return Err(PolicyError::InvalidStatus(code));
        }

        let pairs = [
            ("ok", &ok, "retriable", &retriable),
            ("ok", &ok, "fatal", &fatal),
            ("retriable", &retriable, "fatal", &fatal),
        ];
        for (first, a, second, b) in pairs {
            let codes: BTreeSet<u16> = a.intersection(b).copied().collect();
            if !codes.is_empty() {
                return Err(PolicyError::Overlap {
                    first,
                    second,
                    codes,
                });
            }
        }

        let stray: BTreeSet<u16> = unauthorized.difference(&fatal).copied().collect();
        if !stray.is_empty() {
            return Err(PolicyError::UnauthorizedNotFatal(stray));
        }

        Ok(Self {
            ok,
            retriable,
            fatal,
            unauthorized,
        })
    }

    /// Place `status` in exactly one class.
    pub fn classify_status(&self, status: u16) -> StatusClass {
        if self.ok.contains(&status) {
            StatusClass::Ok
        } else if self.retriable.contains(&status) {
            StatusClass::Retriable
        } else if self.fatal.contains(&status) {
            StatusClass::Fatal
        } else {
            StatusClass::Unhandled
        }
    }

    pub fn is_unauthorized(&self, status: u16) -> bool {
        self.unauthorized.contains(&status)
    }
}

impl TryFrom<StatusPolicyConfig> for StatusPolicy {
    type Error = PolicyError;

    fn try_from(config: StatusPolicyConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}
