//! # Sitelog Shared Library
//!
//! Domain types and business rules for the Sitelog task tracker: engineers
//! log daily and monthly work items against the projects they are assigned
//! to, supervisors review them, and an administrator provisions users and
//! projects.
//!
//! ## Module Organization
//!
//! - `models`: Users, projects and tasks, with their Postgres queries
//! - `store`: Persistence ports plus Postgres and in-memory adapters
//! - `auth`: Principals, JWT assertions, password hashing, authorization guard
//! - `lifecycle`: Task creation, listing, deletion and review
//! - `oversight`: Administrator views and provisioning
//! - `db`: Connection pool and migrations
//! - `error`: Domain error kinds shared by every operation

pub mod auth;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod oversight;
pub mod store;

/// Current version of the Sitelog shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
