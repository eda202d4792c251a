pub mod config;
pub mod events;
pub mod server;
pub mod traffic;
