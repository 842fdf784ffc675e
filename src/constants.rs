// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application identifier used for the library folder, log file and dialogs
pub const APP_ID: &str = "photo-picker";

/// Human readable application name
pub const APP_NAME: &str = "Photo Picker";

/// Button labels
pub const TAKE_PHOTO_LABEL: &str = "Take Photo";
pub const CHOOSE_PHOTO_LABEL: &str = "Choose Photo";

/// Source labels shown on the first description line
pub const CAMERA_SOURCE_LABEL: &str = "camera capture";
pub const LIBRARY_SOURCE_LABEL: &str = "library selection";

/// Location hint when the picker gave neither a path nor an asset id
pub const IN_MEMORY_HINT: &str = "in-memory image object";

/// Prefix for library asset identifiers
pub const ASSET_ID_PREFIX: &str = "library asset id: ";

/// Location hint once a camera capture has been written to the library
pub const SAVED_TO_LIBRARY_HINT: &str = "saved to library";

/// Description shown before any image was picked
pub const PLACEHOLDER_DESCRIPTION: &str = "No image selected yet";

/// Default V4L2 capture device
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";

/// Preferred viewfinder resolution
///
/// The terminal renders far fewer pixels than this, so there is no point
/// asking the sensor for more.
pub const VIEWFINDER_WIDTH: u32 = 1280;
pub const VIEWFINDER_HEIGHT: u32 = 720;

/// Number of mmap buffers for the capture stream
pub const CAPTURE_BUFFER_COUNT: u32 = 4;

/// Viewfinder frame channel depth; older frames are dropped when full
pub const FRAME_CHANNEL_CAPACITY: usize = 4;

/// Consecutive failed buffer reads before the viewfinder gives up on a device
pub const MAX_CAPTURE_ERRORS: u32 = 10;

/// Pause after a failed buffer read
pub const CAPTURE_RETRY_DELAY: Duration = Duration::from_millis(50);

/// UI tick, also the input poll timeout
pub const UI_TICK: Duration = Duration::from_millis(16);

/// JPEG quality for photos written to the library
pub const JPEG_QUALITY: u8 = 92;

/// File in the config directory recording that library access was declined
pub const LIBRARY_DECLINED_MARKER: &str = "library-declined";

/// Image extensions offered by the library picker
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

/// Settings applications tried, in order, by "Go to Settings"
pub const SETTINGS_COMMANDS: &[&[&str]] = &[
    &["cosmic-settings"],
    &["gnome-control-center", "privacy"],
    &["systemsettings"],
    &["xfce4-settings-manager"],
];

/// Marker file present inside a Flatpak sandbox
pub const FLATPAK_INFO_PATH: &str = "/.flatpak-info";
