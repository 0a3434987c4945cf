//! # Karaoke Common Library
//!
//! Shared code for the karaoke services including:
//! - Error type shared by the library layers
//! - Configuration file loading and path resolution
//! - Timestamp utilities and the submission clock
//! - SQLite initialization and song catalog queries

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
pub use time::SubmissionClock;
