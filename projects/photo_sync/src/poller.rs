use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use interfaces_flickr_feed::index::{fetch_user_feed, FetchUserFeedError};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info};

use crate::config::Config;
use crate::db::photo::models::NewPhoto;
use crate::db::photo::queries::{photo_exists, upsert_photo};
use crate::db::PgPool;

/// Tally of one fetch-and-persist pass over the feed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added: usize,
    pub updated: usize,
}

impl SyncOutcome {
    fn record(&mut self, already_present: bool) {
        if already_present {
            self.updated += 1;
        } else {
            self.added += 1;
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncFeedError {
    #[error("FetchUserFeed: {source}")]
    FetchUserFeed {
        #[from]
        source: FetchUserFeedError,
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
    #[error("UpsertPhoto: {source}")]
    UpsertPhoto {
        #[from]
        source: crate::db::photo::queries::UpsertPhotoError,
    },
}

/// One poll cycle: fetch the configured user's feed and upsert every item,
/// overwriting records that already exist. Shared by the background loop
/// and `POST /admin/poll`. The fetch happens before any write, so a fetch
/// failure leaves the store untouched.
pub async fn sync_feed(pool: &PgPool, config: &Config) -> Result<SyncOutcome, SyncFeedError> {
    let fetched = fetch_user_feed(&config.flickr_user, config.feed_timeout).await?;

    let mut conn = pool
        .get()
        .map_err(|source| SyncFeedError::GetConnectionFromPool { source })?;

    let mut outcome = SyncOutcome::default();

    for photo in &fetched {
        let already_present = photo_exists(&mut conn, &photo.id)?;

        let now = Utc::now().naive_utc();
        upsert_photo(
            &mut conn,
            &NewPhoto {
                id: &photo.id,
                url: &photo.url,
                title: photo.title.as_deref(),
                raw: Some(&photo.raw),
                first_seen_at: now,
                last_seen_at: now,
            },
        )?;

        outcome.record(already_present);
    }

    Ok(outcome)
}

/// Background loop: one `sync_feed` pass, then sleep `poll_interval`,
/// forever. Errors are logged and count as a zero-progress cycle.
/// Cancellation is cooperative at the sleep boundary via the watch channel.
pub async fn run(pool: PgPool, config: Arc<Config>, shutdown: watch::Receiver<()>) {
    let interval = config.poll_interval;

    run_with(
        move || {
            let pool = pool.clone();
            let config = config.clone();

            async move {
                info!("Syncing Flickr feed for {}", config.flickr_user);
                sync_feed(&pool, &config).await
            }
        },
        interval,
        shutdown,
    )
    .await
}

/// Drives the loop around any per-cycle step: a failing cycle is logged and
/// the next one still runs after `interval`.
pub async fn run_with<F, Fut>(mut cycle: F, interval: Duration, mut shutdown: watch::Receiver<()>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<SyncOutcome, SyncFeedError>>,
{
    loop {
        match cycle().await {
            Ok(outcome) => info!(
                "Feed sync done: {} added, {} updated",
                outcome.added, outcome.updated
            ),
            Err(err) => error!("Feed sync failed: {err}"),
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = shutdown.changed() => {
                info!("Poller stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    #[test]
    fn it_tallies_added_and_updated_separately() {
        let mut outcome = SyncOutcome::default();

        outcome.record(false);
        outcome.record(false);
        outcome.record(true);

        assert_eq!(outcome, SyncOutcome { added: 2, updated: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn it_attempts_the_next_cycle_after_a_failed_one() {
        let interval = Duration::from_secs(300);
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let mut call = 0usize;
        let poller = tokio::spawn(run_with(
            move || {
                call += 1;
                let events = events_tx.clone();

                async move {
                    events.send((call, Instant::now())).unwrap();

                    if call == 1 {
                        Err(SyncFeedError::FetchUserFeed {
                            source: FetchUserFeedError::UnexpectedStatus {
                                status: StatusCode::BAD_GATEWAY,
                            },
                        })
                    } else {
                        Ok(SyncOutcome::default())
                    }
                }
            },
            interval,
            shutdown_rx,
        ));

        let (first, first_at) = events_rx.recv().await.unwrap();
        assert_eq!(first, 1);

        // The failing cycle is swallowed; the next one still runs, a full
        // interval later.
        let (second, second_at) = events_rx.recv().await.unwrap();
        assert_eq!(second, 2);
        assert!(second_at - first_at >= interval);

        // The loop still honors shutdown after surviving an error.
        shutdown_tx.send(()).unwrap();
        poller.await.unwrap();
    }
}
