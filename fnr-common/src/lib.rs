//! # FNR Common Library
//!
//! Shared code for the ranking updater:
//! - Error types
//! - Configuration loading and resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
