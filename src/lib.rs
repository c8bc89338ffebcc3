pub mod config;
pub mod download;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod patch;
pub mod recover;
pub mod server;

pub use config::Config;
