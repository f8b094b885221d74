//! Authentication and authorization
//!
//! # Modules
//!
//! - [`principal`]: The caller types (`Principal`, `Role`)
//! - [`password`]: Argon2id hashing and verification
//! - [`jwt`]: HS256 token creation and validation
//! - [`identity`]: Login flows and assertion handling
//! - [`authorization`]: Role table and membership/ownership predicates
//! - [`middleware`]: Axum bearer-token and route-class middleware

pub mod authorization;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod principal;
