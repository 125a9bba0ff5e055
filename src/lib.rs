//! kitty-escrow library crate.
//!
//! Re-exports all internal modules so that integration tests (in `tests/`)
//! can access the same code that `main.rs` uses.

pub mod chain;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
