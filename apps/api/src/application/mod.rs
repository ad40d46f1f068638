pub mod envelope;
pub mod handlers;
pub mod messages;
pub mod models;
pub mod rules;
pub mod sanitize;
pub mod store;
pub mod validation;
