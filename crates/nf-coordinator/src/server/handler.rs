//! Request handling for the notification endpoints
//!
//! Every request gets a 200 with the same body. What differs is the side
//! effect: validation only logs, success and failure dispatch the matching
//! action on a detached task, and anything else (other paths, any method
//! but GET) is ignored.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::{Method, Uri};
use axum::routing::get;
use axum::Router;

use nf_protocol::{NotificationKind, NotificationRequest, RESPONSE_BODY};

use crate::action::dispatch;
use crate::state::CoordinatorState;

/// Build the router for all notification endpoints
pub fn router(state: Arc<CoordinatorState>) -> Router {
    let mut router = Router::new();
    for kind in NotificationKind::ALL {
        router = router.route(kind.path(), get(notify).fallback(ignored));
    }
    router.fallback(ignored).with_state(state)
}

async fn notify(
    State(state): State<Arc<CoordinatorState>>,
    ConnectInfo(sender): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    query: Option<Query<Vec<(String, String)>>>,
) -> &'static str {
    // axum routes HEAD to GET handlers; only a real GET is a notification
    if method != Method::GET {
        return ignored(method, uri).await;
    }
    let Some(kind) = NotificationKind::from_path(uri.path()) else {
        return ignored(method, uri).await;
    };

    // An undecodable query counts as no declared host
    let pairs = query.map(|Query(pairs)| pairs).unwrap_or_default();
    let request = NotificationRequest::from_query(kind, &pairs, sender);
    let label = state.attribution(&request);

    tracing::info!(
        "Received notificate request from [{}] for {}",
        label,
        uri.path()
    );

    match state.action_for(kind) {
        None => tracing::info!("Validated successfully"),
        Some(action) => {
            dispatch(Arc::clone(&state.executor), action.clone(), label);
        }
    }

    RESPONSE_BODY
}

async fn ignored(method: Method, uri: Uri) -> &'static str {
    tracing::debug!("Ignoring {} {}", method, uri);
    RESPONSE_BODY
}
