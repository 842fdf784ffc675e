// SPDX-License-Identifier: MPL-2.0

//! Platform backends
//!
//! Concrete implementations of the collaborator traits for a Linux desktop:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            App / Launcher / Gate            │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │               Backend Layer                 │
//! │  ┌─────────────┐  ┌────────────────────┐    │
//! │  │   Camera    │  │   Photo library    │    │
//! │  │   (V4L2)    │  │ (Pictures dir, rfd)│    │
//! │  └─────────────┘  └────────────────────┘    │
//! │  ┌─────────────┐  ┌────────────────────┐    │
//! │  │   Portal    │  │    Permissions     │    │
//! │  │   (zbus)    │  │ (access(2), portal)│    │
//! │  └─────────────┘  └────────────────────┘    │
//! └─────────────────────────────────────────────┘
//! ```

pub mod camera;
pub mod library;
pub mod permissions;
pub mod portal;

use crate::constants::FLATPAK_INFO_PATH;
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Whether we run inside a Flatpak sandbox
pub fn is_sandboxed() -> bool {
    Path::new(FLATPAK_INFO_PATH).exists()
}

/// `access(2)` for the real user, mapping failure to the OS error
pub(crate) fn access(path: &Path, mode: libc::c_int) -> io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    let rc = unsafe { libc::access(c_path.as_ptr(), mode) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
