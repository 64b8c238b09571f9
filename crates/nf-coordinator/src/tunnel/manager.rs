//! Owns every tunnel for one coordinator run

use futures::future::join_all;

use nf_core::config::TunnelConfig;
use nf_core::error::TunnelConnectError;
use nf_core::{Host, HostSet, TunnelState};

use super::process::Tunnel;
use super::status::{StatusBoard, TunnelStatus};

/// Opens one reverse tunnel per host and tears them all down together.
///
/// Startup is all-or-nothing: if any host fails to connect, every tunnel
/// opened so far is closed before the error is returned.
pub struct TunnelManager {
    config: TunnelConfig,
    port: u16,
    tunnels: Vec<Tunnel>,
    board: StatusBoard,
}

impl TunnelManager {
    /// Create a manager forwarding `port` on every host
    pub fn new(config: TunnelConfig, port: u16) -> Self {
        Self {
            config,
            port,
            tunnels: Vec::new(),
            board: StatusBoard::new(),
        }
    }

    /// Shared view of per-host state, usable from other tasks
    pub fn status_board(&self) -> StatusBoard {
        self.board.clone()
    }

    /// State of one host's tunnel
    pub fn status(&self, host: &str) -> Option<TunnelStatus> {
        self.board.get(host)
    }

    /// State of every tunnel, sorted by host
    pub fn statuses(&self) -> Vec<(String, TunnelStatus)> {
        self.board.snapshot()
    }

    /// Number of tunnels currently held open
    pub fn len(&self) -> usize {
        self.tunnels.len()
    }

    /// Whether no tunnels are held
    pub fn is_empty(&self) -> bool {
        self.tunnels.is_empty()
    }

    /// Open a tunnel to a single host.
    ///
    /// A host that already has a live tunnel is left alone.
    pub async fn open(&mut self, host: &Host) -> Result<(), TunnelConnectError> {
        if self.tunnels.iter().any(|t| t.host() == host.name) {
            tracing::debug!("Tunnel to {} already open", host.name);
            return Ok(());
        }

        self.board.register(&host.name);
        tracing::info!("Starting SSH into {}", host);

        let tunnel = Tunnel::connect(host, self.port, &self.config, self.board.clone()).await?;
        tracing::info!("Connected to {}", host.name);
        self.tunnels.push(tunnel);
        Ok(())
    }

    /// Open tunnels to every host in order, rolling back on the first failure
    pub async fn open_all(&mut self, hosts: &HostSet) -> Result<(), TunnelConnectError> {
        for host in hosts {
            self.board.register(&host.name);
        }

        for host in hosts {
            if let Err(e) = self.open(host).await {
                tracing::error!("{}", e);
                self.close_all().await;
                return Err(e);
            }
        }

        tracing::info!(
            "{} tunnel(s) established on port {}",
            self.board.count(TunnelState::Established),
            self.port
        );
        Ok(())
    }

    /// Close every tunnel concurrently.
    ///
    /// Bounded by one grace period plus kill time; never fails. Every
    /// tracked host ends `Closed`, including ones that failed to connect.
    pub async fn close_all(&mut self) {
        let tunnels = std::mem::take(&mut self.tunnels);
        if !tunnels.is_empty() {
            tracing::info!("Closing {} tunnel(s)...", tunnels.len());
        }

        let grace = self.config.close_grace;
        join_all(tunnels.into_iter().map(|tunnel| tunnel.close(grace))).await;

        self.board.close_remaining();
    }
}
