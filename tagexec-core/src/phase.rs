//! Request-processing phases.
//!
//! The set is closed and fixed at build time. `rewrite` and the TLS handshake
//! phase are not part of it: neither can be configured on a route-scoped
//! extension, so the orchestrator never re-enters them.

use crate::error::PhaseParseError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A stage of request processing at which extension logic may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Raw downstream bytes are available (stream proxying).
    Preread,
    /// Request headers are available; the request may still be rejected.
    Access,
    /// Upstream response headers are available.
    HeaderFilter,
    /// Upstream response body chunks are available.
    BodyFilter,
    /// The response has been fully sent.
    Log,
}

impl Phase {
    /// Every phase, in pipeline order.
    pub const ALL: [Phase; 5] = [
        Phase::Preread,
        Phase::Access,
        Phase::HeaderFilter,
        Phase::BodyFilter,
        Phase::Log,
    ];

    /// Number of phases.
    pub const COUNT: usize = Self::ALL.len();

    /// The wire name of this phase.
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Preread => "preread",
            Phase::Access => "access",
            Phase::HeaderFilter => "header_filter",
            Phase::BodyFilter => "body_filter",
            Phase::Log => "log",
        }
    }

    /// Dense position of this phase in [`Phase::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The single-bit [`PhaseSet`] for this phase.
    pub const fn flag(self) -> PhaseSet {
        match self {
            Phase::Preread => PhaseSet::PREREAD,
            Phase::Access => PhaseSet::ACCESS,
            Phase::HeaderFilter => PhaseSet::HEADER_FILTER,
            Phase::BodyFilter => PhaseSet::BODY_FILTER,
            Phase::Log => PhaseSet::LOG,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = PhaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| PhaseParseError(s.to_string()))
    }
}

bitflags::bitflags! {
    /// An extension's capability table: the phases it implements a handler for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PhaseSet: u8 {
        /// Implements `preread`.
        const PREREAD = 1 << 0;
        /// Implements `access`.
        const ACCESS = 1 << 1;
        /// Implements `header_filter`.
        const HEADER_FILTER = 1 << 2;
        /// Implements `body_filter`.
        const BODY_FILTER = 1 << 3;
        /// Implements `log`.
        const LOG = 1 << 4;
    }
}

impl PhaseSet {
    /// Whether the set contains a handler for `phase`.
    pub const fn contains_phase(self, phase: Phase) -> bool {
        self.contains(phase.flag())
    }

    /// Iterate the phases in this set, in pipeline order.
    pub fn iter_phases(self) -> impl Iterator<Item = Phase> {
        Phase::ALL
            .into_iter()
            .filter(move |phase| self.contains_phase(*phase))
    }
}

impl From<Phase> for PhaseSet {
    fn from(phase: Phase) -> Self {
        phase.flag()
    }
}

impl FromIterator<Phase> for PhaseSet {
    fn from_iter<I: IntoIterator<Item = Phase>>(iter: I) -> Self {
        iter.into_iter()
            .fold(PhaseSet::empty(), |set, phase| set | phase.flag())
    }
}
