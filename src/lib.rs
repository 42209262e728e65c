//! Treehole export library crate for archiving PKU Treehole threads.
//!
//! The library reads the session credentials a browser would hold, fetches a
//! post and every page of its comments from the Treehole API, and assembles
//! them into one [`Aggregate`] that can be exported as JSON for rendering.

pub mod config;
pub mod export;
pub mod treehole;

pub use config::ExportConfig;
pub use export::ExportFormat;
pub use treehole::{
    Aggregate, AmbientCredentials, Comment, CommentQuery, HttpTransport, Post, PostId,
    RequestTransport, ResponseEnvelope, ThreadIntake, TreeholeClient, TreeholeError,
};
