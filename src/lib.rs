//! # Calendar Gateway Library
//!
//! HTTP gateway exposing Google Calendar "tools" to assistants. Every tool
//! call borrows a bearer token from one process-wide cache that refreshes
//! itself with a long-lived refresh token.
//!
//! Modules:
//! - `cache`: single-slot access token cache and its error type
//! - `sources`: Google OAuth2 token endpoint (refresh and authorization-code grants)
//! - `calendar`: Calendar API client and event payload shaping
//! - `server`: axum routes: tools, MCP manifest/query, OAuth2 flow
//! - `config`: YAML configuration with environment expansion and validation

pub mod cache;
pub mod calendar;
pub mod config;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::cache::error::TokenRefreshError;
pub use crate::cache::token_cache::TokenCache;
pub use crate::config::types::ServiceConfig;
