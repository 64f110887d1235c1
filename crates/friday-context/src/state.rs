//! Conversation phase.
//!
//! - Expired -> Active (an exchange is committed)
//! - Active -> Expired (inactivity gap exceeds the expiry, observed lazily,
//!   or an explicit reset)

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Whether a conversation is currently open for follow-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPhase {
    /// An interaction happened within the expiry window.
    Active,
    /// No interaction yet, or the last one is older than the expiry window.
    Expired,
}

impl fmt::Display for ContextPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextPhase::Active => write!(f, "Active"),
            ContextPhase::Expired => write!(f, "Expired"),
        }
    }
}

impl ContextPhase {
    /// Phase implied by the time of the last interaction.
    ///
    /// `gap` is the time elapsed since that interaction, if any.
    pub fn from_gap(gap: Option<Duration>, expiry: Duration) -> Self {
        match gap {
            Some(gap) if !exceeds(gap, expiry) => ContextPhase::Active,
            _ => ContextPhase::Expired,
        }
    }
}

/// Expiry window for a configured number of seconds.
///
/// Values too large for [`Duration`] saturate to [`Duration::MAX`].
pub fn expiry_window(expiry_secs: u64) -> Duration {
    i64::try_from(expiry_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// True when `gap` is strictly beyond the expiry threshold. Negative gaps
/// (clock stepped backwards) count as zero.
pub(crate) fn exceeds(gap: Duration, expiry: Duration) -> bool {
    gap.max(Duration::zero()) > expiry
}
