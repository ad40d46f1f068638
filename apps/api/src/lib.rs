pub mod application;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod routes;
pub mod state;
