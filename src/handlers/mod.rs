// src/handlers/mod.rs

pub mod actions;
pub mod files;
pub mod health;
pub mod quiz;
pub mod threads;
