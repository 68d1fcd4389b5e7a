//! Persistence layer for tracked projects and pending update notices
//!
//! This module owns the SQLite database that records which projects are
//! tracked, which versions have been observed for each of them, and which of
//! those observations have not been delivered to the notifier yet.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Caller    │────▶│  Registry   │────▶│    Codec    │
//! │ (discovery) │     │  (facade)   │     │ (major.minor│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                        │       │
//!            one write tx│       │one write tx
//!                        ▼       ▼
//!              ┌─────────────┐ ┌─────────────┐
//!              │  Projects   │ │    Queue    │
//!              │(url,version)│ │  (pending)  │
//!              └─────────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`codec`]: Splits a version string into its major prefix and minor suffix
//! - [`error`]: Error type shared by every store operation
//! - [`projects`]: Project records and their per-major version history
//! - [`queue`]: Per-project FIFO of pending update notices
//! - [`registry`]: Transactional facade combining projects and queue
//! - [`schema`]: Table layout and connection setup
//! - [`types`]: `Project` value object handed to callers and renderers

pub mod codec;
pub mod error;
pub mod projects;
pub mod queue;
pub mod registry;
pub mod schema;
pub mod types;

pub use codec::VersionKey;
pub use error::RegistryError;
pub use registry::Registry;
pub use types::{PendingBundle, Project};
