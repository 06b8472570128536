use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use thiserror::Error;

use crate::db::{photo::queries::list_photos, PgPool};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("GetConnectionFromPool: {source}")]
    GetConnectionFromPool {
        #[from]
        source: r2d2::Error,
    },
    #[error(transparent)]
    ListPhotos {
        #[from]
        source: crate::db::photo::queries::ListPhotosError,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::GetConnectionFromPool { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
            HandlerError::ListPhotos { source } => (StatusCode::INTERNAL_SERVER_ERROR, source.to_string()).into_response(),
        }
    }
}

/// Axum handler: GET /photos — the whole collection, unauthenticated.
pub async fn handler(Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    let mut conn = match pool.get() {
        Ok(c) => c,
        Err(source) => return HandlerError::GetConnectionFromPool { source }.into_response(),
    };

    let all = match list_photos(&mut conn) {
        Ok(all) => all,
        Err(source) => return HandlerError::ListPhotos { source }.into_response(),
    };

    (StatusCode::OK, Json(all)).into_response()
}

#[cfg(test)]
mod tests {
    use crate::db::photo::models::Photo;
    use chrono::NaiveDateTime;

    fn photo(id: &str, title: Option<&str>) -> Photo {
        Photo {
            id: id.to_string(),
            url: format!("https://example.com/{id}.jpg"),
            title: title.map(str::to_string),
            raw: Some(serde_json::json!({"link": "internal"})),
            first_seen_at: NaiveDateTime::default(),
            last_seen_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn it_serializes_records_with_plain_string_ids_only() {
        let records = vec![photo("a", Some("First")), photo("b", None)];

        let json = serde_json::to_value(&records).unwrap();

        assert_eq!(json[0]["id"], "a");
        assert_eq!(json[1]["id"], "b");
        assert_eq!(json[1]["title"], serde_json::Value::Null);
        // Internal bookkeeping never reaches the transport shape.
        assert!(json[0].get("raw").is_none());
        assert!(json[0].get("first_seen_at").is_none());
    }
}
