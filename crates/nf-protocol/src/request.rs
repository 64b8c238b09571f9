//! Inbound notification requests

use std::net::SocketAddr;

use crate::kind::NotificationKind;
use crate::query::declared_host;

/// One inbound call, built per request and consumed immediately
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Which endpoint was called
    pub kind: NotificationKind,
    /// Identity the caller claims, if it sent exactly one
    pub declared_host: Option<String>,
    /// Network address the call arrived from
    pub sender: SocketAddr,
}

impl NotificationRequest {
    /// Build a request from decoded query pairs
    pub fn from_query<K, V>(kind: NotificationKind, pairs: &[(K, V)], sender: SocketAddr) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            kind,
            declared_host: declared_host(pairs).map(str::to_string),
            sender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query() {
        let sender: SocketAddr = "127.0.0.1:53211".parse().unwrap();
        let req = NotificationRequest::from_query(
            NotificationKind::Success,
            &[("host", "build1")],
            sender,
        );
        assert_eq!(req.declared_host.as_deref(), Some("build1"));
        assert_eq!(req.sender, sender);

        let req = NotificationRequest::from_query::<&str, &str>(
            NotificationKind::Validate,
            &[],
            sender,
        );
        assert_eq!(req.declared_host, None);
    }
}
