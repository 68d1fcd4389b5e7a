pub mod config;
pub mod message;
pub mod notifier;
pub mod store;
