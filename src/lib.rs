//! transchat: a thin chat and document-translation service over a hosted
//! chat-completion model.
//!
//! The [`orchestrator`] composes text extraction from [`upload`] with the
//! [`gateway`]; [`server`] exposes it over HTTP. [`conversation`] holds the
//! client-side history used by the interactive CLI.

pub mod config;
pub mod conversation;
pub mod gateway;
pub mod orchestrator;
pub mod server;
pub mod upload;

pub use config::Config;
pub use orchestrator::{Failure, FailureKind, Orchestrator};
