//! Per-host tunnel status
//!
//! The board is written by the manager and by each tunnel's output monitor
//! task, and read by anyone holding a clone. All transitions go through
//! [`TunnelState::can_transition_to`]; an illegal step is logged and
//! ignored rather than applied.

use std::sync::Arc;

use dashmap::DashMap;

use nf_core::TunnelState;

/// Snapshot of one tunnel's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelStatus {
    /// Lifecycle state
    pub state: TunnelState,
    /// Last line of output seen from the tunnel process
    pub last_line: Option<String>,
}

impl TunnelStatus {
    fn pending() -> Self {
        Self {
            state: TunnelState::Pending,
            last_line: None,
        }
    }
}

/// Shared map of host name to tunnel status
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<DashMap<String, TunnelStatus>>,
}

impl StatusBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a host in the `Pending` state
    pub fn register(&self, host: &str) {
        self.inner.insert(host.to_string(), TunnelStatus::pending());
    }

    /// Current status of a host
    pub fn get(&self, host: &str) -> Option<TunnelStatus> {
        self.inner.get(host).map(|entry| entry.clone())
    }

    /// Current state of a host
    pub fn state(&self, host: &str) -> Option<TunnelState> {
        self.inner.get(host).map(|entry| entry.state)
    }

    /// Last output line recorded for a host
    pub fn last_line(&self, host: &str) -> Option<String> {
        self.inner.get(host).and_then(|entry| entry.last_line.clone())
    }

    /// All statuses, sorted by host name
    pub fn snapshot(&self) -> Vec<(String, TunnelStatus)> {
        let mut all: Vec<_> = self
            .inner
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Number of hosts in a given state
    pub fn count(&self, state: TunnelState) -> usize {
        self.inner.iter().filter(|entry| entry.state == state).count()
    }

    /// Move a host to `next` if the transition is legal
    pub fn transition(&self, host: &str, next: TunnelState) -> bool {
        let Some(mut entry) = self.inner.get_mut(host) else {
            tracing::warn!("Transition to {} for untracked tunnel {}", next, host);
            return false;
        };
        if !entry.state.can_transition_to(next) {
            tracing::warn!(
                "Ignoring illegal tunnel transition for {}: {} -> {}",
                host,
                entry.state,
                next
            );
            return false;
        }
        tracing::debug!("Tunnel {}: {} -> {}", host, entry.state, next);
        entry.state = next;
        true
    }

    /// Move a host from `from` to `to`, only if it is currently in `from`
    pub fn transition_if(&self, host: &str, from: TunnelState, to: TunnelState) -> bool {
        match self.inner.get_mut(host) {
            Some(mut entry) if entry.state == from && from.can_transition_to(to) => {
                entry.state = to;
                true
            }
            _ => false,
        }
    }

    /// Record a line of tunnel output
    pub fn record_line(&self, host: &str, line: &str) {
        if let Some(mut entry) = self.inner.get_mut(host) {
            entry.last_line = Some(line.to_string());
        }
    }

    /// Close every host that is not already `Closed`.
    ///
    /// Used after teardown for entries whose tunnel was never handed to the
    /// manager: a failed connect, or one interrupted by shutdown. The last
    /// output line is kept.
    pub fn close_remaining(&self) {
        for mut entry in self.inner.iter_mut() {
            entry.state = TunnelState::Closed;
        }
    }
}
