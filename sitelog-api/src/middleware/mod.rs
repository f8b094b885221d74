//! Middleware for the API server
//!
//! Authentication and route-class gating live in `sitelog_shared::auth`;
//! this crate only adds response hardening.

pub mod security;
