//! # domains
//!
//! Core models, errors, port traits and the list-query pipeline shared by
//! every content type of the thinking-models platform.

pub mod errors;
pub mod models;
pub mod ports;
pub mod query;

pub use errors::*;
pub use models::*;
pub use ports::*;
pub use query::*;
