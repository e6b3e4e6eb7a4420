pub mod client;
pub mod config;
pub mod db;
pub mod domain;
pub mod environment;
pub mod errors;
pub mod filter;
pub mod init;
pub mod queries;
pub mod record;
pub mod routes;
pub mod server;
pub mod service;
