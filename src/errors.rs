// SPDX-License-Identifier: MPL-2.0

//! Error types for the photo picker
//!
//! Every failure that reaches the screen is one of the four [`AppError`]
//! kinds. Backends report their own [`DeviceError`] / [`StorageError`]
//! causes, which are folded into an [`AppError`] before the UI sees them.

use crate::permissions::Capability;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The user (or policy) refused access to a capability
    PermissionDenied(Capability),
    /// The capability is missing on this machine, e.g. no camera
    CapabilityUnavailable(String),
    /// The picker finished without a usable image
    MediaMissing,
    /// Writing a capture to the photo library failed
    SaveFailed(String),
}

/// Capture device errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No video capture device found
    NoCameraFound,
    /// The device exists but could not be opened or configured
    OpenFailed(String),
    /// The device delivers a pixel format we cannot decode
    UnsupportedFormat(String),
    /// Streaming started but buffers stopped arriving
    Disconnected(String),
}

/// Photo library errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No pictures directory could be resolved for this user
    NoLibraryDirectory,
    /// The library folder is not writable by consent
    NotAuthorized,
    /// Encoding the image failed
    EncodingFailed(String),
    /// Filesystem error
    Io(String),
}

/// A dialog the screen should show for an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// Title, message and a single acknowledgement
    Info { title: String, message: String },
    /// Cancel vs. "Go to Settings"
    Remediation { title: String, message: String },
}

impl Alert {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert::Info {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Alert::Info { title, .. } | Alert::Remediation { title, .. } => title,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Alert::Info { message, .. } | Alert::Remediation { message, .. } => message,
        }
    }
}

impl AppError {
    /// The alert this error surfaces, if any
    ///
    /// `MediaMissing` is an implicit cancel and shows nothing.
    pub fn alert(&self) -> Option<Alert> {
        match self {
            AppError::PermissionDenied(capability) => Some(Alert::Remediation {
                title: "Permission Required".to_string(),
                message: format!(
                    "Please allow access to the {} in your system settings.",
                    capability.display_name()
                ),
            }),
            AppError::CapabilityUnavailable(msg) => Some(Alert::info("Unavailable", msg.clone())),
            AppError::MediaMissing => None,
            AppError::SaveFailed(msg) => Some(Alert::info("Save Failed", msg.clone())),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::PermissionDenied(capability) => {
                write!(f, "Access to the {} was denied", capability.display_name())
            }
            AppError::CapabilityUnavailable(msg) => write!(f, "Unavailable: {}", msg),
            AppError::MediaMissing => write!(f, "The picker returned no image"),
            AppError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NoCameraFound => write!(f, "This device has no camera"),
            DeviceError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            DeviceError::UnsupportedFormat(msg) => write!(f, "Unsupported camera format: {}", msg),
            DeviceError::Disconnected(msg) => {
                write!(f, "The camera stopped delivering frames: {}", msg)
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NoLibraryDirectory => write!(f, "No pictures directory available"),
            StorageError::NotAuthorized => {
                write!(f, "Access to the photo library has not been granted")
            }
            StorageError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            StorageError::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for DeviceError {}
impl std::error::Error for StorageError {}

// Device problems surface as a missing capability
impl From<DeviceError> for AppError {
    fn from(err: DeviceError) -> Self {
        AppError::CapabilityUnavailable(err.to_string())
    }
}

// The only storage operation the UI waits on is the camera save
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::SaveFailed(err.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<image::ImageError> for StorageError {
    fn from(err: image::ImageError) -> Self {
        StorageError::EncodingFailed(err.to_string())
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        DeviceError::OpenFailed(err.to_string())
    }
}
