use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{verify_admin_key, AdminKeyError};
use crate::config::Config;
use crate::db::{
    photo::models::NewPhoto,
    photo::queries::{photo_exists, upsert_photo},
    PgPool,
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("InvalidAdminKey: {source}")]
    InvalidAdminKey {
        #[from]
        source: AdminKeyError,
    },
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error("PhotoExists: {source}")]
    PhotoExists {
        #[from]
        source: crate::db::photo::queries::PhotoExistsError,
    },
    #[error(transparent)]
    UpsertPhoto {
        #[from]
        source: crate::db::photo::queries::UpsertPhotoError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::InvalidAdminKey { source } => (StatusCode::UNAUTHORIZED, source.to_string()).into_response(),
            HandlerError::GetConnectionFromPool { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::PhotoExists { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::UpsertPhoto { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
        }
    }
}

/// JSON payload expected by the endpoint.
#[derive(Deserialize)]
pub struct AddPhotosRequestBody {
    photos: Vec<PhotoPayload>,
}

#[derive(Deserialize)]
pub struct PhotoPayload {
    id: String,
    url: String,
    title: Option<String>,
}

#[derive(Serialize)]
pub struct AddPhotosResponseBody {
    status: &'static str,
    added: usize,
    updated: usize,
}

/// Axum handler: POST /admin/add-photos
pub async fn handler(
    Extension(pool): Extension<PgPool>,
    Extension(config): Extension<Arc<Config>>,
    headers: HeaderMap,
    Json(input): Json<AddPhotosRequestBody>,
) -> impl IntoResponse {
    // Auth runs before any store access.
    if let Err(source) = verify_admin_key(&headers, &config.admin_key) {
        return HandlerError::InvalidAdminKey { source }.into_response();
    }

    let mut conn = match pool.get() {
        Ok(c) => c,
        Err(source) => return HandlerError::GetConnectionFromPool { source }.into_response(),
    };

    let (mut added, mut updated) = (0usize, 0usize);

    for photo in &input.photos {
        let already_present = match photo_exists(&mut conn, &photo.id) {
            Ok(present) => present,
            Err(source) => return HandlerError::PhotoExists { source }.into_response(),
        };

        if already_present {
            updated += 1;
        } else {
            added += 1;
        }

        let now = Utc::now().naive_utc();
        let new = NewPhoto {
            id: &photo.id,
            url: &photo.url,
            // Empty titles normalize to NULL at the boundary.
            title: photo.title.as_deref().filter(|title| !title.is_empty()),
            raw: None,
            first_seen_at: now,
            last_seen_at: now,
        };

        if let Err(source) = upsert_photo(&mut conn, &new) {
            return HandlerError::UpsertPhoto { source }.into_response();
        }
    }

    (
        StatusCode::OK,
        Json(AddPhotosResponseBody {
            status: "ok",
            added,
            updated,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_serializes_the_response_body_shape() {
        let body = AddPhotosResponseBody {
            status: "ok",
            added: 2,
            updated: 1,
        };

        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"ok","added":2,"updated":1}"#
        );
    }

    #[test]
    fn it_deserializes_the_request_body_shape() {
        let input: AddPhotosRequestBody = serde_json::from_str(
            r#"{"photos":[{"id":"111","url":"https://example.com/111.jpg"},
                          {"id":"222","url":"https://example.com/222.jpg","title":"Dunes"}]}"#,
        )
        .unwrap();

        assert_eq!(input.photos.len(), 2);
        assert_eq!(input.photos[0].id, "111");
        assert_eq!(input.photos[0].title, None);
        assert_eq!(input.photos[1].title.as_deref(), Some("Dunes"));
    }
}
