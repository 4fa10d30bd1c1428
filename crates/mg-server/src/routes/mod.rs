//! Route handlers.

pub mod download;
pub mod health;
pub mod index;
pub mod tools;
