//! coursesync_client - Course administration against an LMS REST API.
//!
//! The synchronizers in [`sync`] drive any [`coursesync_core::platform::Platform`]:
//! the HTTP [`CanvasClient`] in production, [`InMemoryPlatform`] in tests.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod inmemory;
pub mod output;
pub mod sync;

pub use client::CanvasClient;
pub use config::Config;
pub use error::{ClientError, OverrideCreationError, Result};
pub use inmemory::InMemoryPlatform;
