pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod subscriptions;
pub mod test_utils;

pub use config::Config;
pub use server::Server;
