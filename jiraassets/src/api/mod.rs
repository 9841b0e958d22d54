pub mod client;
pub mod error;
pub mod models;
pub mod object_schema;
pub mod objects;
pub mod status_types;

pub use client::Client;
pub use error::ApiError;
pub use models::*;
