//! Agent against a real coordinator
//!
//! The tunnel is faked with a `sh -c` script, so the agent reaches the
//! listener directly on localhost just as it would through the forward.

#![cfg(unix)]

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use nf_agent::AgentClient;
use nf_core::config::{AgentConfig, CoordinatorConfig, TunnelConfig};
use nf_core::error::ActionError;
use nf_core::{ActionSpec, HostSet, ProcessRunner, TunnelState};
use nf_coordinator::action::ActionExecutor;
use nf_coordinator::Coordinator;
use nf_protocol::NotificationKind;

static PORT_COUNTER: AtomicU16 = AtomicU16::new(0);

fn get_test_port() -> u16 {
    let offset = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    39600 + offset
}

struct Recorder(mpsc::UnboundedSender<ActionSpec>);

#[async_trait]
impl ActionExecutor for Recorder {
    async fn execute(&self, action: &ActionSpec) -> Result<(), ActionError> {
        let _ = self.0.send(action.clone());
        Ok(())
    }
}

async fn start_coordinator(
    port: u16,
) -> (
    CancellationToken,
    tokio::task::JoinHandle<Result<(), nf_core::NotificateError>>,
    mpsc::UnboundedReceiver<ActionSpec>,
) {
    let config = CoordinatorConfig {
        bind_host: "127.0.0.1".to_string(),
        port,
        success_action: ActionSpec::Command(vec!["echo".into(), "done".into()]),
        tunnel: TunnelConfig {
            ssh_program: "sh".to_string(),
            ssh_args: vec![
                "-c".to_string(),
                "echo Success; while read l; do [ \"$l\" = exit ] && exit 0; done".to_string(),
                "fake-ssh".to_string(),
            ],
            close_grace: Duration::from_secs(2),
            ..TunnelConfig::default()
        },
        ..CoordinatorConfig::default()
    };
    let hosts = HostSet::from_pairs([("build1", "10.0.0.5")]).unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel();
    let coordinator =
        Coordinator::with_executor(config, hosts, Arc::new(Recorder(tx))).with_ready(ready_tx);
    let board = coordinator.status_board();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(coordinator.run(cancel.clone()));
    timeout(Duration::from_secs(10), ready_rx)
        .await
        .expect("listener never came up")
        .expect("coordinator exited early");
    assert_eq!(board.state("build1"), Some(TunnelState::Established));

    (cancel, handle, rx)
}

fn agent(port: u16) -> AgentClient {
    AgentClient::new(&AgentConfig {
        port,
        host_name: Some("build1".to_string()),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_command_success_invokes_action_once() {
    let port = get_test_port();
    let (cancel, handle, mut actions) = start_coordinator(port).await;
    let agent = agent(port);

    agent.validate_connection().await.unwrap();
    let report = agent
        .run_and_notify(&["true".to_string()], &ProcessRunner::new())
        .await
        .unwrap();
    assert_eq!(report.kind, NotificationKind::Success);

    let action = timeout(Duration::from_secs(2), actions.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(action, ActionSpec::Command(vec!["echo".into(), "done".into()]));
    assert!(timeout(Duration::from_millis(300), actions.recv()).await.is_err());

    cancel.cancel();
    timeout(Duration::from_secs(10), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_command_failure_invokes_failure_action() {
    let port = get_test_port();
    let (cancel, handle, mut actions) = start_coordinator(port).await;

    let report = agent(port)
        .run_and_notify(&["false".to_string()], &ProcessRunner::new())
        .await
        .unwrap();
    assert_eq!(report.kind, NotificationKind::Failure);

    let action = timeout(Duration::from_secs(2), actions.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(action, ActionSpec::default_failure());

    cancel.cancel();
    timeout(Duration::from_secs(10), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
