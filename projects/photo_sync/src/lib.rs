//! Flickr photo feed mirroring service
//!
//! - REST API endpoints in `endpoints/`
//! - PostgreSQL models and queries in `db/`
//! - Background feed poller in `poller`
//! - Requires DATABASE_URL, FLICKR_USER and ADMIN_KEY env vars

pub mod auth;
pub mod config;
pub mod db;
pub mod endpoints;
pub mod poller;
