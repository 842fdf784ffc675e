// SPDX-License-Identifier: MPL-2.0

//! Platform permission service
//!
//! | capability | host                      | sandbox              |
//! |------------|---------------------------|----------------------|
//! | camera     | `access(2)` on the node   | camera portal        |
//! | library    | library folder permissions | same                 |

use super::camera::device_permission;
use super::library::PhotoLibrary;
use super::portal;
use crate::constants::SETTINGS_COMMANDS;
use crate::permissions::{Capability, PermissionService, PermissionState};
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SystemPermissions {
    camera_device: PathBuf,
    library: Arc<PhotoLibrary>,
    sandboxed: bool,
}

impl SystemPermissions {
    pub fn new(camera_device: PathBuf, library: Arc<PhotoLibrary>, sandboxed: bool) -> Self {
        Self {
            camera_device,
            library,
            sandboxed,
        }
    }
}

impl PermissionService for SystemPermissions {
    async fn status(&self, capability: Capability) -> PermissionState {
        match capability {
            // The portal has no status query; asking again is silent once
            // the user has answered
            Capability::Camera if self.sandboxed => PermissionState::NotDetermined,
            Capability::Camera => device_permission(&self.camera_device),
            Capability::PhotoLibrary => self.library.permission_state(),
        }
    }

    async fn request(&self, capability: Capability) -> PermissionState {
        match capability {
            Capability::Camera if self.sandboxed => match portal::access_camera().await {
                Ok(true) => PermissionState::Authorized,
                Ok(false) => PermissionState::Denied,
                Err(e) => {
                    warn!(error = %e, "Camera portal unavailable");
                    PermissionState::Restricted
                }
            },
            // Device nodes cannot be prompted for; report what they are
            Capability::Camera => device_permission(&self.camera_device),
            Capability::PhotoLibrary => self.library.request_access().await,
        }
    }
}

/// Launch the desktop settings application
///
/// `command` overrides the built-in candidates; it is split on whitespace.
pub fn open_settings(command: Option<&str>) -> io::Result<()> {
    let custom: Vec<&str> = command.map(|c| c.split_whitespace().collect()).unwrap_or_default();
    let candidates: Vec<&[&str]> = if custom.is_empty() {
        SETTINGS_COMMANDS.to_vec()
    } else {
        vec![custom.as_slice()]
    };

    let mut last_error = io::Error::new(io::ErrorKind::NotFound, "no settings application found");
    for argv in candidates {
        let Some((program, args)) = argv.split_first() else {
            continue;
        };
        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_) => {
                info!(program, "Opened settings");
                return Ok(());
            }
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}
