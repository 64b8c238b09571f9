//! Coordinator run loop
//!
//! A run acquires every tunnel, binds the listener, serves until told to
//! stop, and then releases every tunnel. The release step runs on every
//! exit path, including a failed startup and a busy port.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use nf_core::config::CoordinatorConfig;
use nf_core::{HostSet, NotificateError};

use crate::action::{ActionExecutor, ProcessExecutor};
use crate::server::NotificationServer;
use crate::state::CoordinatorState;
use crate::tunnel::{StatusBoard, TunnelManager};

/// One coordinator run over a fixed host set
pub struct Coordinator {
    config: CoordinatorConfig,
    hosts: HostSet,
    executor: Arc<dyn ActionExecutor>,
    tunnels: TunnelManager,
    ready: Option<oneshot::Sender<SocketAddr>>,
}

impl Coordinator {
    /// Create a coordinator that runs actions as local processes
    pub fn new(config: CoordinatorConfig, hosts: HostSet) -> Self {
        Self::with_executor(config, hosts, Arc::new(ProcessExecutor::new()))
    }

    /// Create a coordinator with a custom action executor
    pub fn with_executor(
        config: CoordinatorConfig,
        hosts: HostSet,
        executor: Arc<dyn ActionExecutor>,
    ) -> Self {
        let tunnels = TunnelManager::new(config.tunnel.clone(), config.port);
        Self {
            config,
            hosts,
            executor,
            tunnels,
            ready: None,
        }
    }

    /// Be told the listener's address once it is bound
    pub fn with_ready(mut self, ready: oneshot::Sender<SocketAddr>) -> Self {
        self.ready = Some(ready);
        self
    }

    /// Live view of tunnel states for this run
    pub fn status_board(&self) -> StatusBoard {
        self.tunnels.status_board()
    }

    /// Run until `cancel` fires or something fails, then tear down
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), NotificateError> {
        let result = self.start_and_serve(&cancel).await;

        self.tunnels.close_all().await;
        match &result {
            Ok(()) => tracing::info!("Coordinator shutdown complete"),
            Err(e) => tracing::error!("Coordinator stopped: {}", e),
        }
        result
    }

    async fn start_and_serve(&mut self, cancel: &CancellationToken) -> Result<(), NotificateError> {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Shutdown requested before all tunnels were up");
                return Ok(());
            }
            opened = self.tunnels.open_all(&self.hosts) => opened?,
        }

        let state = Arc::new(CoordinatorState::with_executor(
            &self.config,
            self.hosts.clone(),
            Arc::clone(&self.executor),
        ));
        let server = NotificationServer::bind(&self.config.listen_address(), state).await?;

        tracing::info!("Starting server on port {}", self.config.port);
        tracing::info!("Will run command {} when done", self.config.success_action);
        tracing::info!("or {} if error", self.config.failure_action);

        if let Some(ready) = self.ready.take() {
            let _ = ready.send(server.local_addr()?);
        }

        server.serve(cancel.clone()).await
    }
}
