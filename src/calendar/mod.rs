pub mod client;
pub mod event;
