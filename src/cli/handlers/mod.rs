//! Command handlers for CLI operations
//!
//! Handlers hold the command execution logic, separate from parsing and
//! validation.

pub mod send;

pub use send::SendCommandHandler;
