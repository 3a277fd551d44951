mod config;
mod error;
mod handler_content;
mod handler_migrations;
mod server;
mod startup;
mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::create_server;
