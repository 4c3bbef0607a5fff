pub mod config;
pub mod error;
pub mod links;
pub mod probe;
pub mod process;
pub mod protocol;
pub mod script;
pub mod server;
pub mod storage;

pub use config::AppConfig;
pub use server::Server;
