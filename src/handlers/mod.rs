// src/handlers/mod.rs

pub mod account;
pub mod auth;
pub mod posts;
pub mod quiz;
