// SPDX-License-Identifier: MPL-2.0

//! Photo library backed by a folder in the user's pictures directory
//!
//! Access is modelled on directory permissions: a missing folder has not
//! been granted yet, a read-only folder is limited access. Answering "No"
//! to the access prompt leaves a marker in the config directory so the
//! folder stays denied instead of being asked about again.

use crate::constants::{
    APP_ID, APP_NAME, IMAGE_EXTENSIONS, JPEG_QUALITY, LIBRARY_DECLINED_MARKER,
};
use crate::errors::StorageError;
use crate::launcher::LibrarySource;
use crate::media::PickerResult;
use crate::permissions::PermissionState;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, RgbaImage};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default library location: `~/Pictures/photo-picker`
pub fn default_library_dir() -> Option<PathBuf> {
    dirs::picture_dir().map(|dir| dir.join(APP_ID))
}

/// Where a declined access prompt is remembered
pub fn default_decline_marker() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_ID).join(LIBRARY_DECLINED_MARKER))
}

#[derive(Debug, Clone)]
pub struct PhotoLibrary {
    root: Option<PathBuf>,
    decline_marker: Option<PathBuf>,
}

impl PhotoLibrary {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            decline_marker: default_decline_marker(),
        }
    }

    /// Keep the decline marker at `marker` instead of the config directory
    pub fn with_decline_marker(mut self, marker: Option<PathBuf>) -> Self {
        self.decline_marker = marker;
        self
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Current access to the library folder
    pub fn permission_state(&self) -> PermissionState {
        let Some(root) = &self.root else {
            return PermissionState::Restricted;
        };

        match std::fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {
                if super::access(root, libc::R_OK | libc::W_OK | libc::X_OK).is_ok() {
                    PermissionState::Authorized
                } else if super::access(root, libc::R_OK | libc::X_OK).is_ok() {
                    PermissionState::Limited
                } else {
                    PermissionState::Denied
                }
            }
            // Something that is not a folder sits where the library should be
            Ok(_) => PermissionState::Restricted,
            // Creating the folder by hand grants access again
            Err(e) if e.kind() == io::ErrorKind::NotFound && self.is_declined() => {
                PermissionState::Denied
            }
            Err(e) => match e.kind() {
                io::ErrorKind::NotFound => PermissionState::NotDetermined,
                io::ErrorKind::PermissionDenied => PermissionState::Denied,
                _ => PermissionState::Restricted,
            },
        }
    }

    /// Ask the user whether the library folder may be created
    pub async fn request_access(&self) -> PermissionState {
        let Some(root) = self.root.clone() else {
            return PermissionState::Restricted;
        };

        let answer = rfd::AsyncMessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title(format!("{} would like to access your photos", APP_NAME))
            .set_description(format!(
                "Photos you take are saved to and chosen from {}",
                root.display()
            ))
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            .await;

        if !matches!(answer, rfd::MessageDialogResult::Yes) {
            info!("Photo library access declined");
            if let Err(e) = self.record_decline().await {
                warn!(error = %e, "Failed to remember declined library access");
            }
            return PermissionState::Denied;
        }

        match tokio::fs::create_dir_all(&root).await {
            Ok(()) => {
                info!(path = %root.display(), "Photo library created");
                self.permission_state()
            }
            Err(e) => {
                warn!(path = %root.display(), error = %e, "Failed to create photo library");
                PermissionState::Denied
            }
        }
    }
}

impl PhotoLibrary {
    fn is_declined(&self) -> bool {
        self.decline_marker.as_deref().is_some_and(Path::exists)
    }

    /// Remember a "No" answer so the prompt is not shown again
    pub async fn record_decline(&self) -> io::Result<()> {
        let Some(marker) = &self.decline_marker else {
            return Ok(());
        };
        if let Some(parent) = marker.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let stamp = chrono::Local::now().to_rfc3339();
        tokio::fs::write(marker, format!("declined {}\n", stamp)).await?;
        debug!(path = %marker.display(), "Recorded declined library access");
        Ok(())
    }
}

impl LibrarySource for PhotoLibrary {
    async fn pick(&self) -> Option<PickerResult> {
        let mut dialog = rfd::AsyncFileDialog::new()
            .set_title("Choose Photo")
            .add_filter("Images", IMAGE_EXTENSIONS);
        if let Some(root) = &self.root
            && root.is_dir()
        {
            dialog = dialog.set_directory(root);
        }

        let handle = dialog.pick_file().await?;
        let path = handle.path().to_path_buf();
        debug!(path = %path.display(), "Library picker returned");

        let image = load_image(path.clone()).await;
        Some(PickerResult {
            image,
            file_path: Some(path),
            asset_id: None,
        })
    }

    async fn save(&self, image: Arc<RgbaImage>) -> Result<PathBuf, StorageError> {
        let root = self.root.clone().ok_or(StorageError::NoLibraryDirectory)?;

        // A first capture asks for the library the same way "Choose Photo" does
        let state = match self.permission_state() {
            PermissionState::NotDetermined => self.request_access().await,
            state => state,
        };
        if state != PermissionState::Authorized {
            warn!(%state, "Not saving capture without library access");
            return Err(StorageError::NotAuthorized);
        }

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

        tokio::task::spawn_blocking(move || write_jpeg(&root, &stamp, &image))
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
    }
}

async fn load_image(path: PathBuf) -> Option<Arc<RgbaImage>> {
    let decoded = tokio::task::spawn_blocking(move || {
        image::open(&path).map(|img| img.into_rgba8()).map_err(|e| (path, e))
    })
    .await
    .ok()?;

    match decoded {
        Ok(rgba) => Some(Arc::new(rgba)),
        Err((path, e)) => {
            warn!(path = %path.display(), error = %e, "Picked file is not a readable image");
            None
        }
    }
}

/// Encode `image` as `IMG_<stamp>.jpg` in the existing folder `dir`,
/// adding `_N` on collisions
fn write_jpeg(dir: &Path, stamp: &str, image: &RgbaImage) -> Result<PathBuf, StorageError> {
    let (path, file) = create_unique(dir, stamp)?;

    let rgb: RgbImage = image.convert();
    let mut writer = BufWriter::new(file);
    let encoded = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(&rgb);
    if let Err(e) = encoded.map_err(StorageError::from).and_then(|()| {
        writer.flush()?;
        Ok(())
    }) {
        let _ = std::fs::remove_file(&path);
        return Err(e);
    }

    Ok(path)
}

fn create_unique(dir: &Path, stamp: &str) -> Result<(PathBuf, File), StorageError> {
    for attempt in 0u32.. {
        let name = if attempt == 0 {
            format!("IMG_{}.jpg", stamp)
        } else {
            format!("IMG_{}_{}.jpg", stamp, attempt)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(StorageError::Io(format!(
        "no free file name for IMG_{} in {}",
        stamp,
        dir.display()
    )))
}
