//! ArchMaster: cache-backed system design generation on top of Gemini.
//!
//! A topic request checks the [`cache`] first and, on a miss, asks the
//! [`gateway`] to generate a [`topic::TopicDocument`], stores it and
//! returns it. Chat requests go straight to the model.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod providers;
pub mod service;
pub mod topic;

pub use error::{ArchError, Result};
pub use service::TopicService;
pub use topic::TopicDocument;
