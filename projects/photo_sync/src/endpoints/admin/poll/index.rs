use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::auth::{verify_admin_key, AdminKeyError};
use crate::config::Config;
use crate::db::PgPool;
use crate::poller::{sync_feed, SyncFeedError};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("InvalidAdminKey: {source}")]
    InvalidAdminKey {
        #[from]
        source: AdminKeyError,
    },
    #[error("SyncFeed: {source}")]
    SyncFeed {
        #[from]
        source: SyncFeedError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidAdminKey { source } => (StatusCode::UNAUTHORIZED, source.to_string()).into_response(),
            // Upstream feed failures are the gateway's fault; everything
            // else behind the sync is ours.
            HandlerError::SyncFeed { source: SyncFeedError::FetchUserFeed { source } } => {
                (StatusCode::BAD_GATEWAY, source.to_string()).into_response()
            }
            HandlerError::SyncFeed { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
        }
    }
}

#[derive(Serialize)]
pub struct PollResponseBody {
    status: &'static str,
}

/// Axum handler: POST /admin/poll — one synchronous poll cycle, same logic
/// and timeout policy as the background loop.
pub async fn handler(
    Extension(pool): Extension<PgPool>,
    Extension(config): Extension<Arc<Config>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Err(source) = verify_admin_key(&headers, &config.admin_key) {
        return HandlerError::InvalidAdminKey { source }.into_response();
    }

    let outcome = match sync_feed(&pool, &config).await {
        Ok(outcome) => outcome,
        Err(source) => return HandlerError::SyncFeed { source }.into_response(),
    };

    info!(
        "Manual poll done: {} added, {} updated",
        outcome.added, outcome.updated
    );

    (StatusCode::OK, Json(PollResponseBody { status: "polled" })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_serializes_the_response_body_shape() {
        let body = PollResponseBody { status: "polled" };

        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"status":"polled"}"#);
    }
}
