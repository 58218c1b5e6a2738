//! openmusic-server: HTTP API for the OpenMusic catalog
//!
//! Layers, leaves first:
//! - [`db`]: connection pool, schema migrations, one repository per table
//! - [`cache`]: key/value cache with expiry (Redis or in-process)
//! - [`queue`]: export request publisher (AMQP)
//! - [`storage`]: album cover files
//! - [`auth`]: JWT tokens and password hashing
//! - [`services`]: like counter and playlist access rules
//! - [`http`]: axum router, handlers, error envelope

pub mod auth;
pub mod cache;
pub mod db;
pub mod http;
pub mod models;
pub mod queue;
pub mod services;
pub mod storage;

pub use http::{build_router, run_server, AppState, ServerConfig};
