//! nf-protocol: Wire contract for notificate
//!
//! The agent reaches the coordinator's listener through a reverse SSH
//! tunnel, so the whole protocol is three plain HTTP GET paths on one
//! shared port, each carrying the caller's declared identity in a `host`
//! query parameter. Every recognized or unrecognized call is answered with
//! status 200 and [`RESPONSE_BODY`].

pub mod kind;
pub mod query;
pub mod request;

pub use kind::NotificationKind;
pub use query::{declared_host, HOST_PARAM};
pub use request::NotificationRequest;

/// Port shared by the reverse tunnel and the notification listener
pub const DEFAULT_PORT: u16 = 10934;

/// Plain-text body sent with every response
pub const RESPONSE_BODY: &str = "Success!";
