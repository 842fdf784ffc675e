// SPDX-License-Identifier: MPL-2.0

//! End-to-end flows through the gatekeeper, launcher and app model,
//! with the platform replaced by in-memory fakes

use futures::channel::mpsc;
use image::RgbaImage;
use photo_picker::app::{Activity, AppModel, Effect, Message};
use photo_picker::backends::camera::Viewfinder;
use photo_picker::errors::{DeviceError, StorageError};
use photo_picker::launcher::{CameraSource, Launcher, LibrarySource, Picker};
use photo_picker::media::{PickerResult, SourceKind};
use photo_picker::permissions::{Capability, PermissionService, PermissionState, authorize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Platform {
    camera: PermissionState,
    library: PermissionState,
    answer: PermissionState,
    prompts: AtomicUsize,
}

impl PermissionService for Platform {
    async fn status(&self, capability: Capability) -> PermissionState {
        match capability {
            Capability::Camera => self.camera,
            Capability::PhotoLibrary => self.library,
        }
    }

    async fn request(&self, _capability: Capability) -> PermissionState {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

struct Webcam {
    frame: Option<RgbaImage>,
}

impl CameraSource for Webcam {
    fn is_available(&self) -> bool {
        true
    }

    fn open(&self) -> Result<Viewfinder, DeviceError> {
        let (mut sender, receiver) = mpsc::channel(2);
        if let Some(frame) = &self.frame {
            sender
                .try_send(Arc::new(frame.clone()))
                .map_err(|e| DeviceError::OpenFailed(e.to_string()))?;
        }
        Ok(Viewfinder::from_receiver(receiver))
    }
}

struct Album {
    full: bool,
}

impl LibrarySource for Album {
    async fn pick(&self) -> Option<PickerResult> {
        Some(PickerResult {
            asset_id: Some("A1B2".into()),
            ..PickerResult::from_image(RgbaImage::new(12, 34))
        })
    }

    async fn save(&self, _image: Arc<RgbaImage>) -> Result<PathBuf, StorageError> {
        if self.full {
            Err(StorageError::Io("No space left on device".into()))
        } else {
            Ok(PathBuf::from("/album/IMG_1.jpg"))
        }
    }
}

/// Drive the app the way the terminal runtime does, resolving effects inline
async fn run(
    app: &mut AppModel,
    platform: &Platform,
    launcher: &Launcher<Webcam, Album>,
    message: Message,
) {
    let mut pending = vec![message];
    while let Some(message) = pending.pop() {
        let Some(effect) = app.update(message) else {
            continue;
        };
        let next = match effect {
            Effect::Authorize(capability) => {
                Message::PermissionResolved(capability, authorize(platform, capability).await)
            }
            Effect::Launch(capability) => match launcher.launch(capability) {
                Ok(Picker::Camera(mut viewfinder)) => {
                    Message::PickerFinished(SourceKind::Camera, Some(viewfinder.capture()))
                }
                Ok(Picker::Library(picking)) => {
                    Message::PickerFinished(SourceKind::Library, picking.await)
                }
                Err(err) => Message::LaunchFailed(err),
            },
            Effect::Save(ticket, image) => Message::Saved(ticket, launcher.save(image).await),
            Effect::OpenSettings | Effect::OpenLibraryFolder => continue,
        };
        pending.push(next);
    }
}

fn platform(camera: PermissionState, library: PermissionState) -> Platform {
    Platform {
        camera,
        library,
        answer: PermissionState::Authorized,
        prompts: AtomicUsize::new(0),
    }
}

#[tokio::test]
async fn test_take_photo_end_to_end() {
    let platform = platform(PermissionState::NotDetermined, PermissionState::Authorized);
    let launcher = Launcher::new(
        Webcam {
            frame: Some(RgbaImage::new(640, 480)),
        },
        Album { full: false },
    );
    let mut app = AppModel::new();

    run(&mut app, &platform, &launcher, Message::TakePhoto).await;

    assert_eq!(platform.prompts.load(Ordering::SeqCst), 1);
    assert_eq!(app.activity(), Activity::Idle);
    assert_eq!(
        app.display().description,
        "Source: camera capture\nLocation: saved to library\nSize: 640 x 480"
    );
}

#[tokio::test]
async fn test_choose_photo_with_limited_access() {
    let platform = platform(PermissionState::Denied, PermissionState::Limited);
    let launcher = Launcher::new(Webcam { frame: None }, Album { full: false });
    let mut app = AppModel::new();

    run(&mut app, &platform, &launcher, Message::ChoosePhoto).await;

    assert_eq!(platform.prompts.load(Ordering::SeqCst), 0);
    assert_eq!(
        app.display().description,
        "Source: library selection\nLocation: library asset id: A1B2\nSize: 12 x 34"
    );
}

#[tokio::test]
async fn test_full_library_keeps_capture_on_screen() {
    let platform = platform(PermissionState::Authorized, PermissionState::Authorized);
    let launcher = Launcher::new(
        Webcam {
            frame: Some(RgbaImage::new(8, 6)),
        },
        Album { full: true },
    );
    let mut app = AppModel::new();

    run(&mut app, &platform, &launcher, Message::TakePhoto).await;

    assert_eq!(app.alert().map(|a| a.title()), Some("Save Failed"));
    assert_eq!(app.alert().map(|a| a.message()), Some("No space left on device"));
    assert_eq!(app.display().image.as_ref().unwrap().dimensions(), (8, 6));
    assert!(app.display().description.contains("in-memory image object"));
}

#[tokio::test]
async fn test_capture_before_first_frame_changes_nothing() {
    let platform = platform(PermissionState::Authorized, PermissionState::Authorized);
    let launcher = Launcher::new(Webcam { frame: None }, Album { full: false });
    let mut app = AppModel::new();
    let before = app.display().clone();

    run(&mut app, &platform, &launcher, Message::TakePhoto).await;

    assert_eq!(app.display(), &before);
    assert!(app.alert().is_none());
}

#[tokio::test]
async fn test_restricted_camera_never_prompts() {
    let platform = platform(PermissionState::Restricted, PermissionState::Authorized);
    let launcher = Launcher::new(Webcam { frame: None }, Album { full: false });
    let mut app = AppModel::new();

    run(&mut app, &platform, &launcher, Message::TakePhoto).await;

    assert_eq!(platform.prompts.load(Ordering::SeqCst), 0);
    assert_eq!(app.alert().map(|a| a.title()), Some("Permission Required"));
}
