//! Clients for outside services.

pub mod client;
