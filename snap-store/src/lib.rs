//! # snap-store: immutable screenshot storage
//!
//! `snap-store` persists captured screenshots as immutable blobs plus a
//! metadata row, addressed by an opaque, unguessable id. There is no update
//! path: a screenshot is created once, read any number of times, and
//! deleted by its owner.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStore`] for tests and development
//! - [`FsStore`] for on-disk persistence with an atomic commit step, so a
//!   crash mid-write never leaves a partially visible screenshot
//!
//! Ownership checks on deletion go through [`access::authorize`], a pure
//! decision function shared with the service layer.

pub mod access;
mod error;
mod fs;
mod memory;
pub mod store;
mod types;

pub use access::{authorize, AccessDecision, DenyReason, Operation, ReadPolicy};
pub use error::{StoreError, StoreResult};
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use store::ScreenshotStore;
pub use types::{Screenshot, ScreenshotId, ScreenshotMeta};
