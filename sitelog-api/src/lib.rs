//! # Sitelog API Server Library
//!
//! HTTP transport for the Sitelog task service. Business rules live in
//! `sitelog_shared`; this crate maps requests onto them.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
