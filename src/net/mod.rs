//! Backend access: request gateway, auth endpoints and wire types.

pub mod auth;
pub mod error;
pub mod gateway;
pub mod types;
