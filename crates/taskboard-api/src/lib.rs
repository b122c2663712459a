//! HTTP implementation of [`taskboard_domain::BoardApi`].

pub mod client;
pub mod credentials;

pub use client::{join_endpoint, HttpBoardApi};
pub use credentials::Credentials;
