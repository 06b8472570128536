use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

const FEED_URL: &str = "https://www.flickr.com/services/feeds/photos_public.gne";

/// One photo from the public feed, normalized for storage.
#[derive(Debug, Clone)]
pub struct FeedPhoto {
    /// Stable id derived from the item's permalink.
    pub id: String,
    /// Direct media URL (`media.m` in the feed).
    pub url: String,
    /// `None` when the feed title is absent or empty.
    pub title: Option<String>,
    /// The feed item exactly as received.
    pub raw: Value,
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    link: String,
    media: FeedMedia,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedMedia {
    m: String,
}

/// Fetches the 20 newest public photos for a Flickr user (NSID like
/// `12345@N01`) and normalizes them. Items without a usable permalink or
/// media URL are dropped. No retries here; callers decide the cadence.
pub async fn fetch_user_feed(
    user_id: &str,
    timeout: Duration,
) -> Result<Vec<FeedPhoto>, FetchUserFeedError> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| FetchUserFeedError::ClientBuild { source })?;

    let response = client
        .get(FEED_URL)
        .query(&[("id", user_id), ("format", "json"), ("nojsoncallback", "1")])
        .send()
        .await
        .map_err(|source| FetchUserFeedError::RequestSend { source })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchUserFeedError::UnexpectedStatus { status });
    }

    let body = response
        .text()
        .await
        .map_err(|source| FetchUserFeedError::ResponseRead { source })?;

    parse_feed_body(&body)
}

fn parse_feed_body(body: &str) -> Result<Vec<FeedPhoto>, FetchUserFeedError> {
    let document: FeedDocument = serde_json::from_str(body)
        .map_err(|source| FetchUserFeedError::DeserializeBody { source })?;

    Ok(document
        .items
        .into_iter()
        .filter_map(normalize_item)
        .collect())
}

fn normalize_item(raw: Value) -> Option<FeedPhoto> {
    let item: FeedItem = serde_json::from_value(raw.clone()).ok()?;
    let id = extract_photo_id(&item.link)?;

    Some(FeedPhoto {
        id: id.to_string(),
        url: item.media.m,
        title: item.title.filter(|title| !title.is_empty()),
        raw,
    })
}

/// The last non-empty path segment of a permalink, trailing slashes
/// stripped: `https://www.flickr.com/photos/12345/67890/` -> `67890`.
pub fn extract_photo_id(link: &str) -> Option<&str> {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[derive(Debug, Error)]
pub enum FetchUserFeedError {
    #[error("ClientBuild: {source}")]
    ClientBuild {
        source: reqwest::Error,
    },

    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("UnexpectedStatus: {status}")]
    UnexpectedStatus {
        status: StatusCode,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },

    #[error("DeserializeBody: {source}")]
    DeserializeBody {
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_BODY: &str = r#"{
        "title": "Uploads from tester",
        "items": [
            {
                "title": "Sunset",
                "link": "https://www.flickr.com/photos/12345@N01/111/",
                "media": {"m": "https://live.staticflickr.com/1/111_m.jpg"},
                "published": "2024-01-01T00:00:00Z"
            },
            {
                "title": "",
                "link": "https://www.flickr.com/photos/12345@N01/222/",
                "media": {"m": "https://live.staticflickr.com/1/222_m.jpg"},
                "published": "2024-01-02T00:00:00Z"
            },
            {
                "title": "No media",
                "link": "https://www.flickr.com/photos/12345@N01/333/"
            }
        ]
    }"#;

    #[test]
    fn it_extracts_the_last_non_empty_path_segment() {
        assert_eq!(
            extract_photo_id("https://example.com/photos/123/456/"),
            Some("456")
        );
        assert_eq!(
            extract_photo_id("https://www.flickr.com/photos/12345@N01/67890"),
            Some("67890")
        );
        assert_eq!(extract_photo_id(""), None);
        assert_eq!(extract_photo_id("////"), None);
    }

    #[test]
    fn it_parses_a_feed_body_and_skips_unusable_items() {
        let photos = parse_feed_body(FEED_BODY).unwrap();

        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].id, "111");
        assert_eq!(photos[0].url, "https://live.staticflickr.com/1/111_m.jpg");
        assert_eq!(photos[0].title.as_deref(), Some("Sunset"));
        assert_eq!(photos[0].raw["published"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn it_normalizes_empty_titles_to_none() {
        let photos = parse_feed_body(FEED_BODY).unwrap();

        assert_eq!(photos[1].id, "222");
        assert_eq!(photos[1].title, None);
    }

    #[test]
    fn it_rejects_a_body_without_an_item_array() {
        let result = parse_feed_body(r#"{"title": "no items here"}"#);

        assert!(matches!(
            result,
            Err(FetchUserFeedError::DeserializeBody { .. })
        ));
    }

    #[test]
    fn it_rejects_a_non_json_body() {
        let result = parse_feed_body("jsonFlickrFeed(...)");

        assert!(matches!(
            result,
            Err(FetchUserFeedError::DeserializeBody { .. })
        ));
    }
}
