//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the HTTP transport used to talk to the marketplace API.

pub mod http;
