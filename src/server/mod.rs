pub mod auth;
pub mod error;
pub mod mcp;
pub mod server;
pub mod tools;
