// src/lib.rs
//! Resume builder: typed resume model, section editors, preview formatting,
//! auth flow and the HTTP API around them.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod types;
pub mod utils;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::core::{BuilderCommand, BuilderSession, FlowController, ResumePreview};
pub use crate::error::{CollaboratorError, FlowError};
pub use crate::types::ResumeDocument;
pub use crate::web::{build_rocket, start_web_server};
