// SPDX-License-Identifier: MPL-2.0

//! Capture/selection launcher
//!
//! Opens the camera viewfinder or the library picker once the gatekeeper
//! has granted the capability.

use crate::backends::camera::Viewfinder;
use crate::errors::{AppError, AppResult, DeviceError, StorageError};
use crate::media::PickerResult;
use crate::permissions::Capability;
use futures::FutureExt;
use futures::future::BoxFuture;
use image::RgbaImage;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Camera hardware
pub trait CameraSource {
    /// Whether a capture device is present at all
    fn is_available(&self) -> bool;

    /// Start streaming into a viewfinder
    fn open(&self) -> Result<Viewfinder, DeviceError>;
}

/// The photo library
pub trait LibrarySource: Send + Sync + 'static {
    /// Show the single-image picker; `None` when the user cancels
    fn pick(&self) -> impl Future<Output = Option<PickerResult>> + Send;

    /// Write a capture into the library, returning where it landed
    fn save(&self, image: Arc<RgbaImage>)
    -> impl Future<Output = Result<PathBuf, StorageError>> + Send;
}

/// An open picker
pub enum Picker {
    /// Live camera preview; the screen captures or cancels it
    Camera(Viewfinder),
    /// Pending library selection, resolves once the dialog closes
    Library(BoxFuture<'static, Option<PickerResult>>),
}

pub struct Launcher<C, L> {
    camera: C,
    library: Arc<L>,
}

impl<C, L> Launcher<C, L>
where
    C: CameraSource,
    L: LibrarySource,
{
    pub fn new(camera: C, library: L) -> Self {
        Self {
            camera,
            library: Arc::new(library),
        }
    }

    pub fn library(&self) -> &Arc<L> {
        &self.library
    }

    /// Present the acquisition UI for an already granted capability
    pub fn launch(&self, capability: Capability) -> AppResult<Picker> {
        match capability {
            Capability::Camera => {
                if !self.camera.is_available() {
                    warn!("No camera hardware present");
                    return Err(DeviceError::NoCameraFound.into());
                }
                let viewfinder = self.camera.open()?;
                info!("Camera viewfinder opened");
                Ok(Picker::Camera(viewfinder))
            }
            Capability::PhotoLibrary => {
                let library = Arc::clone(&self.library);
                info!("Presenting library picker");
                Ok(Picker::Library(async move { library.pick().await }.boxed()))
            }
        }
    }

    /// Write a capture to the library in the background
    pub fn save(&self, image: Arc<RgbaImage>) -> BoxFuture<'static, Result<PathBuf, AppError>> {
        let library = Arc::clone(&self.library);
        async move { library.save(image).await.map_err(AppError::from) }.boxed()
    }
}
