// SPDX-License-Identifier: MPL-2.0

//! V4L2 camera backend
//!
//! Talks to `/dev/videoN` directly. Permission on the host is plain file
//! access to the device node; inside a sandbox the portal decides (see
//! [`crate::backends::portal`]).

pub mod convert;
pub mod viewfinder;

pub use viewfinder::Viewfinder;

use crate::constants::{VIEWFINDER_HEIGHT, VIEWFINDER_WIDTH};
use crate::errors::DeviceError;
use crate::launcher::CameraSource;
use crate::permissions::PermissionState;
use convert::SUPPORTED_FOURCCS;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use v4l::capability::Flags;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// A capture device found on the system
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub path: PathBuf,
    pub name: String,
    pub driver: String,
}

/// Camera at a fixed device node
#[derive(Debug, Clone)]
pub struct V4l2Camera {
    path: PathBuf,
}

impl V4l2Camera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CameraSource for V4l2Camera {
    fn is_available(&self) -> bool {
        if !self.path.exists() {
            return false;
        }
        match Device::with_path(&self.path) {
            Ok(dev) => dev
                .query_caps()
                .map(|caps| caps.capabilities.contains(Flags::VIDEO_CAPTURE))
                .unwrap_or(false),
            // Present but not openable: permission is the gatekeeper's call
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Camera node not openable");
                true
            }
        }
    }

    fn open(&self) -> Result<Viewfinder, DeviceError> {
        let device = Device::with_path(&self.path)?;
        let format = negotiate_format(&device)?;
        info!(
            path = %self.path.display(),
            width = format.width,
            height = format.height,
            fourcc = %format.fourcc,
            "Camera format negotiated"
        );
        Viewfinder::start(device, format)
    }
}

/// Pick the first supported pixel format the driver accepts
fn negotiate_format(device: &Device) -> Result<Format, DeviceError> {
    let mut last: Option<FourCC> = None;
    for fourcc in SUPPORTED_FOURCCS {
        let wanted = Format::new(VIEWFINDER_WIDTH, VIEWFINDER_HEIGHT, fourcc);
        let actual = device.set_format(&wanted)?;
        if actual.fourcc == fourcc {
            return Ok(actual);
        }
        debug!(wanted = %fourcc, got = %actual.fourcc, "Driver substituted format");
        last = Some(actual.fourcc);
    }
    Err(DeviceError::UnsupportedFormat(
        last.map(|f| f.to_string()).unwrap_or_default(),
    ))
}

/// Permission state of a device node for the current user
///
/// A missing node is not a permission problem; the launcher reports it as
/// absent hardware.
pub fn device_permission(path: &Path) -> PermissionState {
    match super::access(path, libc::R_OK | libc::W_OK) {
        Ok(()) => PermissionState::Authorized,
        Err(e) => match e.raw_os_error() {
            Some(libc::ENOENT) => PermissionState::Authorized,
            Some(libc::EACCES) => PermissionState::Denied,
            _ if e.kind() == io::ErrorKind::NotFound => PermissionState::Authorized,
            _ => PermissionState::Restricted,
        },
    }
}

/// Scan `/dev/video*` for video capture devices
pub fn list_devices() -> Vec<CameraInfo> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir("/dev")
        .into_iter()
        .flatten()
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("video"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let caps = Device::with_path(&path).ok()?.query_caps().ok()?;
            if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
                // Metadata nodes share the video prefix
                return None;
            }
            Some(CameraInfo {
                path,
                name: caps.card,
                driver: caps.driver,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_node_is_unavailable_but_not_denied() {
        let camera = V4l2Camera::new("/nonexistent/video9");
        assert!(!camera.is_available());
        assert_eq!(
            device_permission(camera.path()),
            PermissionState::Authorized
        );
    }

    #[test]
    fn test_readable_node_is_authorized() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(device_permission(file.path()), PermissionState::Authorized);
    }
}
