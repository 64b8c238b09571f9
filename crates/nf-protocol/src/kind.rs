//! Notification kinds and their endpoint paths
//!
//! # Message Flow
//!
//! 1. Agent sends `Validate` before running anything, to prove the tunnel
//!    and the listener are both up
//! 2. Agent runs the user's command
//! 3. Agent sends exactly one of `Success` or `Failure`

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three request kinds the listener understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Reachability check, never triggers an action
    Validate,
    /// Command finished with exit code 0
    Success,
    /// Command finished with a non-zero exit code or could not start
    Failure,
}

impl NotificationKind {
    /// All kinds, in protocol order
    pub const ALL: [NotificationKind; 3] = [
        NotificationKind::Validate,
        NotificationKind::Success,
        NotificationKind::Failure,
    ];

    /// Endpoint path for this kind
    pub fn path(self) -> &'static str {
        match self {
            NotificationKind::Validate => "/validate_connection",
            NotificationKind::Success => "/notificate",
            NotificationKind::Failure => "/notificate_error",
        }
    }

    /// Map a request path back to a kind.
    ///
    /// Matching is exact: trailing slashes or sub-paths are not endpoints.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path() == path)
    }

    /// Kind to report for a finished command
    pub fn for_outcome(succeeded: bool) -> Self {
        if succeeded {
            NotificationKind::Success
        } else {
            NotificationKind::Failure
        }
    }

    /// Whether a call of this kind invokes a local action
    pub fn triggers_action(self) -> bool {
        !matches!(self, NotificationKind::Validate)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Validate => write!(f, "validate"),
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Failure => write!(f, "failure"),
        }
    }
}
