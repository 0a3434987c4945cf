//! Song request queue
//!
//! Turns the heterogeneous strings held by the list store into canonical
//! entries, and implements submission and id-addressed removal on top of a
//! store that only removes by exact value.

pub mod decode;
pub mod entry;
pub mod extract;
pub mod service;

pub use entry::{DecodedEntry, EntryQuality, QueueEntry, UNKNOWN_NAME, UNKNOWN_SONG};
pub use service::{
    NormalizeReport, QueueError, QueueResult, QueueService, QueueSettings, Submission,
};
