// src/models/mod.rs

pub mod post;
pub mod publication;
pub mod user;
