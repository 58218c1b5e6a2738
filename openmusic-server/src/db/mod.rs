//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - One parameterized statement per repository method
//! - Rely on DB constraints and map violations to client errors,
//!   no check-then-insert
//! - Single-statement auto-commit, no multi-step transactions

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
