//! # snap-service: the core behind the Snapbin screenshot-sharing API
//!
//! A client authenticates, uploads a captured image, and gets back a link
//! other parties can use to fetch the same bytes. This crate wires the
//! pieces with real invariants together:
//!
//! - `snap-auth`'s [`TokenIssuer`]/[`TokenValidator`] for time-bounded
//!   credentials
//! - `snap-store`'s [`ScreenshotStore`] backends for immutable,
//!   access-controlled content
//!
//! The HTTP facade (routing, schema validation, serialization) lives
//! elsewhere; it talks to [`ScreenshotService`] through the typed
//! [`Request`]/[`Response`] pairs in [`dispatch`].
//!
//! [`TokenIssuer`]: snap_auth::TokenIssuer
//! [`TokenValidator`]: snap_auth::TokenValidator
//! [`ScreenshotStore`]: snap_store::ScreenshotStore

pub mod config;
pub mod dispatch;
mod error;
mod service;

pub use config::{ServiceOptions, StorageLocation};
pub use dispatch::{Request, Response};
pub use error::{ServiceError, ServiceResult};
pub use service::{IssuedToken, ScreenshotService};
