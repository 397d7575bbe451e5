//! Codegate - debounced access-code validation against a central API
//!
//! This library exposes modules for use in integration tests.

pub mod client;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod format;
pub mod models;
