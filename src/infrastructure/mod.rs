pub mod compiler_client;
pub mod config;
pub mod logging;
pub mod security;
