//! Notification listener
//!
//! Binding and serving are separate steps so the coordinator can report a
//! busy port before anything is served.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use nf_core::NotificateError;

use super::handler::router;
use crate::state::CoordinatorState;

/// A bound, not yet serving, notification listener
pub struct NotificationServer {
    listener: TcpListener,
    state: Arc<CoordinatorState>,
}

impl NotificationServer {
    /// Bind the listener to `address`
    pub async fn bind(address: &str, state: Arc<CoordinatorState>) -> Result<Self, NotificateError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| NotificateError::Bind {
                address: address.to_string(),
                source,
            })?;
        Ok(Self { listener, state })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> Result<SocketAddr, NotificateError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until `cancel` fires or the listener fails
    pub async fn serve(self, cancel: CancellationToken) -> Result<(), NotificateError> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!("Notification listener on {}", addr);
        }

        let app = router(self.state).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .map_err(NotificateError::Listener)?;

        tracing::info!("Notification listener stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use nf_core::config::CoordinatorConfig;
    use nf_core::HostSet;

    fn state() -> Arc<CoordinatorState> {
        Arc::new(CoordinatorState::new(&CoordinatorConfig::default(), HostSet::new()))
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let first = NotificationServer::bind("127.0.0.1:0", state()).await.unwrap();
        let taken = first.local_addr().unwrap().to_string();

        let err = match NotificationServer::bind(&taken, state()).await {
            Ok(_) => panic!("second bind should fail"),
            Err(e) => e,
        };
        assert!(matches!(err, NotificateError::Bind { .. }));
        assert!(err.to_string().contains(&taken));
    }

    #[tokio::test]
    async fn test_serve_validates_and_stops_on_cancel() {
        let server = NotificationServer::bind("127.0.0.1:0", state()).await.unwrap();
        let addr = server.local_addr().unwrap();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(server.serve(cancel.clone()));

        let body = reqwest::get(format!("http://{}/validate_connection?host=me", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "Success!");

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
