//! State shared with every request handler

use std::sync::Arc;

use nf_core::config::CoordinatorConfig;
use nf_core::{ActionSpec, HostSet};
use nf_protocol::{NotificationKind, NotificationRequest};

use crate::action::{ActionExecutor, ProcessExecutor};

/// Immutable view of the run handed to the listener
pub struct CoordinatorState {
    /// Hosts with a tunnel in this run
    pub hosts: HostSet,
    /// Action for success notifications
    pub success_action: ActionSpec,
    /// Action for failure notifications
    pub failure_action: ActionSpec,
    /// How actions are carried out
    pub executor: Arc<dyn ActionExecutor>,
}

impl CoordinatorState {
    /// Create state that runs actions as local processes
    pub fn new(config: &CoordinatorConfig, hosts: HostSet) -> Self {
        Self::with_executor(config, hosts, Arc::new(ProcessExecutor::new()))
    }

    /// Create state with a custom executor
    pub fn with_executor(
        config: &CoordinatorConfig,
        hosts: HostSet,
        executor: Arc<dyn ActionExecutor>,
    ) -> Self {
        Self {
            hosts,
            success_action: config.success_action.clone(),
            failure_action: config.failure_action.clone(),
            executor,
        }
    }

    /// Action to run for a notification kind, if any
    pub fn action_for(&self, kind: NotificationKind) -> Option<&ActionSpec> {
        if !kind.triggers_action() {
            return None;
        }
        match kind {
            NotificationKind::Failure => Some(&self.failure_action),
            _ => Some(&self.success_action),
        }
    }

    /// Label a request by the host it came from.
    ///
    /// A declared host that resolves to a known host is shown by name;
    /// anything else falls back to the raw sender address.
    pub fn attribution(&self, request: &NotificationRequest) -> String {
        request
            .declared_host
            .as_deref()
            .and_then(|declared| self.hosts.resolve(declared))
            .map(|host| host.name.clone())
            .unwrap_or_else(|| request.sender.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn state() -> CoordinatorState {
        let hosts = HostSet::from_pairs([("build1", "10.0.0.5"), ("build2", "10.0.0.6")]).unwrap();
        CoordinatorState::new(&CoordinatorConfig::default(), hosts)
    }

    fn request(declared: Option<&str>) -> NotificationRequest {
        let sender: SocketAddr = "127.0.0.1:53122".parse().unwrap();
        NotificationRequest {
            kind: NotificationKind::Success,
            declared_host: declared.map(str::to_string),
            sender,
        }
    }

    #[test]
    fn test_attribution_by_name() {
        assert_eq!(state().attribution(&request(Some("build1"))), "build1");
    }

    #[test]
    fn test_attribution_by_address() {
        assert_eq!(state().attribution(&request(Some("10.0.0.6"))), "build2");
    }

    #[test]
    fn test_attribution_unknown_falls_back_to_sender() {
        let state = state();
        assert_eq!(state.attribution(&request(Some("mystery"))), "127.0.0.1:53122");
        assert_eq!(state.attribution(&request(None)), "127.0.0.1:53122");
    }

    #[test]
    fn test_action_for_kind() {
        let state = state();
        assert!(state.action_for(NotificationKind::Validate).is_none());
        assert_eq!(
            state.action_for(NotificationKind::Success),
            Some(&ActionSpec::default_success())
        );
        assert_eq!(
            state.action_for(NotificationKind::Failure),
            Some(&ActionSpec::default_failure())
        );
    }
}
