//! Configuration model for lockfile.
//!
//! `Config` describes how locks are taken: which backend, whether holders
//! are per-thread, and how long and how often to retry. It is usually read
//! from a YAML file passed with `--config`. Unknown fields are ignored and
//! every field has a default, so an empty document is a valid config.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
