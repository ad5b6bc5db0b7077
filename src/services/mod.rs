//! Business rules over the store ports.

pub mod admin;
pub mod auth;
pub mod bulk;
pub mod category;
pub mod status;
