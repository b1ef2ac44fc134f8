//! # Path Watcher
//!
//! This crate provides per-directory filesystem watching for the vigil
//! monitor. Each registered directory gets its own non-recursive watch
//! handle, and every detected create/delete/rename is normalized into a
//! [`ChangeEvent`] and forwarded into a single ingestion channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     PathWatcherSet                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  dir A ──watch──┐                                        │
//! │  dir B ──watch──┼──► normalize ──► ChangeEvent channel   │
//! │  dir C ──watch──┘        │                               │
//! │                          └───────► WatchFault channel    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod event;
pub mod watcher;

pub use error::{Result, WatchError};
pub use event::{ChangeEvent, ChangeKind, EntryKind};
pub use watcher::{PathWatcherSet, WatchFault};
