// SPDX-License-Identifier: GPL-3.0-only

//! Runtime settings
//!
//! Nothing is persisted; settings come from command-line flags with the
//! defaults below.

use crate::backends::library::default_library_dir;
use crate::constants::{APP_ID, DEFAULT_CAMERA_DEVICE};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// V4L2 capture device used by "Take Photo"
    pub camera_device: PathBuf,
    /// Photo library folder; `None` when no pictures directory exists
    pub library_dir: Option<PathBuf>,
    /// Command launched by "Go to Settings" instead of the built-in list
    pub settings_command: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_device: PathBuf::from(DEFAULT_CAMERA_DEVICE),
            library_dir: default_library_dir(),
            settings_command: None,
        }
    }
}

impl Settings {
    /// Where the terminal UI writes its log, since stderr is the screen
    pub fn log_file() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(APP_ID).join(format!("{}.log", APP_ID)))
    }
}
