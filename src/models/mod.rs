// src/models/mod.rs

pub mod category;
pub mod page;
pub mod status;
pub mod user;
