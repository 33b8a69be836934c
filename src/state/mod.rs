//! Client-side session state and navigation.

pub mod nav;
pub mod session;
