//! Access-token validation.

pub mod jwt;
