pub mod auth;
pub mod blob;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod identity;
pub mod image;
pub mod middleware;
pub mod store;
pub mod validate;
