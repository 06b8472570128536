use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use serde_json::Value;

use crate::db::schema::photos;

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = photos)]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    #[serde(skip_serializing)]
    pub raw: Option<Value>,
    #[serde(skip_serializing)]
    pub first_seen_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub last_seen_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = photos)]
pub struct NewPhoto<'a> {
    pub id: &'a str,
    pub url: &'a str,
    pub title: Option<&'a str>,
    pub raw: Option<&'a Value>,
    pub first_seen_at: NaiveDateTime,
    pub last_seen_at: NaiveDateTime,
}
