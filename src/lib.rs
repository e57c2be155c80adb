// src/lib.rs

pub mod assistant;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
pub mod widgets;

pub use routes::create_router;
