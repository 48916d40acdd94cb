#![warn(clippy::all)]

pub mod auth;
pub mod catalog;
pub mod cooking;
pub mod database;
pub mod error;
pub mod recipes;

pub use error::{Error, Result};
