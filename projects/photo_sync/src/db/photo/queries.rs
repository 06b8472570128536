use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::upsert::excluded;
use thiserror::Error;

use crate::db::{photo::models::*, schema::photos::dsl::*};

#[derive(Debug, Error)]
pub enum UpsertPhotoError {
    #[error("UpsertPhoto: {source}")]
    UpsertPhoto {
        #[from]
        source: diesel::result::Error,
    },
}

/// Insert-or-overwrite keyed on `id`. `first_seen_at` is kept from the
/// original row; every other field takes the incoming value, including
/// NULLs.
pub fn upsert_photo(
    conn: &mut PgConnection,
    new: &NewPhoto,
) -> Result<Photo, UpsertPhotoError> {
    diesel::insert_into(photos)
        .values(new)
        .on_conflict(id)
        .do_update()
        .set((
            url.eq(excluded(url)),
            title.eq(excluded(title)),
            raw.eq(excluded(raw)),
            last_seen_at.eq(excluded(last_seen_at)),
        ))
        .get_result(conn)
        .map_err(|source| UpsertPhotoError::UpsertPhoto { source })
}

#[derive(Debug, Error)]
pub enum PhotoExistsError {
    #[error("PhotoExists: {source}")]
    PhotoExists {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn photo_exists(
    conn: &mut PgConnection,
    id_val: &str,
) -> Result<bool, PhotoExistsError> {
    photos
        .filter(id.eq(id_val))
        .select(count_star())
        .first::<i64>(conn)
        .map(|count| count > 0)
        .map_err(|source| PhotoExistsError::PhotoExists { source })
}

#[derive(Debug, Error)]
pub enum ListPhotosError {
    #[error("ListPhotos: {source}")]
    ListPhotos {
        #[from]
        source: diesel::result::Error,
    },
}

pub fn list_photos(conn: &mut PgConnection) -> Result<Vec<Photo>, ListPhotosError> {
    photos
        .order_by(first_seen_at)
        .load::<Photo>(conn)
        .map_err(|source| ListPhotosError::ListPhotos { source })
}
