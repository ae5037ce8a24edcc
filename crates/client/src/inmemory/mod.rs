//! In-memory platform for testing.
//!
//! [`InMemoryPlatform`] implements every platform trait over maps wrapped in
//! `Arc<RwLock<_>>`. Tests seed it, inject failures at chosen calls and then
//! inspect both the resulting state and the log of mutating calls.
//!
//! # Example
//!
//! ```rust,ignore
//! use coursesync_client::inmemory::{FailurePoint, InMemoryPlatform};
//!
//! let platform = InMemoryPlatform::new(7);
//! let set_id = platform.seed_group_set("Labs").await;
//! platform.fail_on(FailurePoint::CreateGroup("Lab B".into())).await;
//! ```

mod platform;

pub use platform::{FailurePoint, InMemoryPlatform};
