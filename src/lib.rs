// SPDX-License-Identifier: MPL-2.0

//! Photo Picker - take a photo or choose one from your library
//!
//! A single-screen terminal application: the user captures an image with the
//! camera or picks one from the photo library, and the screen shows a preview
//! together with where the image came from, where it lives and its size.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`permissions`]: Permission gatekeeper for the camera and the library
//! - [`launcher`]: Opens the camera viewfinder or the library picker
//! - [`presenter`]: Turns a picked image into what the screen shows
//! - [`app`]: Screen state machine driven by messages
//! - [`backends`]: V4L2 camera, photo library folder, desktop portal
//! - [`terminal`]: The terminal UI loop
//!
//! ```text
//! key press ─► Gatekeeper ─► Launcher ─► Presenter ─► screen
//!                 (prompt)     (picker)
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod launcher;
pub mod media;
pub mod permissions;
pub mod presenter;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::Settings;
pub use errors::{AppError, AppResult};
pub use media::{PickedMedia, SourceKind};
pub use permissions::{Capability, PermissionState};
