//! Azkaban CLI - command line client for the Azkaban workflow scheduler
//!
//! This library provides the pieces behind the `azkaban` binary:
//! - Session management (login, logout, guarded operations)
//! - The Azkaban AJAX request layer
//! - Project archiving for uploads
//! - Configuration and session persistence
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  azkaban CLI                 │
//! │  login │ logout │ upload │ schedule │ execute│
//! └─────────────────────┬────────────────────────┘
//!                       │
//! ┌─────────────────────▼────────────────────────┐
//! │        Azkaban (session manager)             │
//! │  session state │ archive │ response decoding │
//! └─────────────────────┬────────────────────────┘
//!                       │
//! ┌─────────────────────▼────────────────────────┐
//! │       AzkabanApi (request layer)             │
//! │  /  │  /manager  │  /schedule  │  /executor  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod archive;
pub mod azkaban;
pub mod config;
pub mod error;
pub mod session_store;

pub use api::{AzkabanApi, HttpApi};
pub use archive::ProjectArchive;
pub use azkaban::{
    Azkaban, ExecuteOutcome, LoggedSession, ScheduleOutcome, UploadOutcome, validate_host,
};
pub use config::{ClientConfig, Config};
pub use error::{Error, ErrorKind, Result};
pub use session_store::SessionStore;
