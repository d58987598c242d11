//! Core infrastructure: configuration, error type and HTTP middleware.

pub mod config;
pub mod error;
pub mod middleware;
