// src/models/mod.rs

pub mod action;
pub mod attachment;
pub mod question;
pub mod thread;
pub mod widget;
