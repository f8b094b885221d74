//! Database plumbing
//!
//! - `pool`: PostgreSQL connection pool with health check
//! - `migrations`: Embedded migration runner
//!
//! Queries live next to the types they load, in `models`.

pub mod migrations;
pub mod pool;
