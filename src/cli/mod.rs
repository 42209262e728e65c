//! CLI operation handlers.
//!
//! - [`export_thread`]: Fetch a thread and write it to the configured output

pub mod export_thread;
