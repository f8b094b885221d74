//! API route handlers, one module per route family
//!
//! - `health`: Banner and health check
//! - `session`: Login and logout for every family
//! - `admin`: User, project and task oversight
//! - `engineer`: Task creation, listing and deletion
//! - `supervisor`: Task listing and review

pub mod admin;
pub mod engineer;
pub mod health;
pub mod session;
pub mod supervisor;
