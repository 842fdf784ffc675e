// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! `update()` is the only place the app's state changes. It never performs
//! I/O itself; anything that has to wait on the platform comes back as an
//! [`Effect`], and its outcome returns later as another [`Message`].

use crate::app::state::{Activity, AppModel, Effect, Focus, Message};
use crate::errors::AppError;
use crate::media::{PickedMedia, PickerResult, SourceKind};
use crate::permissions::Capability;
use crate::presenter::{PickerDelegate, SaveTicket};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

impl AppModel {
    /// Main message handler
    pub fn update(&mut self, message: Message) -> Option<Effect> {
        match message {
            // ===== Buttons =====
            Message::TakePhoto => self.handle_request(Capability::Camera),
            Message::ChoosePhoto => self.handle_request(Capability::PhotoLibrary),
            Message::FocusNext => {
                self.focus = self.focus.toggle();
                None
            }
            Message::Activate => match self.focus {
                Focus::TakePhoto => self.handle_request(Capability::Camera),
                Focus::ChoosePhoto => self.handle_request(Capability::PhotoLibrary),
            },

            // ===== Acquisition =====
            Message::PermissionResolved(capability, granted) => {
                self.handle_permission_resolved(capability, granted)
            }
            Message::LaunchFailed(err) => {
                self.activity = Activity::Idle;
                self.show_error(&err);
                None
            }
            Message::PickerFinished(source, result) => self.handle_picker_finished(source, result),
            Message::Saved(ticket, result) => self.handle_saved(ticket, result),

            // ===== Alerts =====
            Message::DismissAlert => {
                self.alerts.pop_front();
                None
            }
            Message::OpenSettings => {
                self.alerts.pop_front();
                Some(Effect::OpenSettings)
            }

            // ===== Description =====
            Message::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            Message::ScrollDown => {
                let max = self.display().description.lines().count().saturating_sub(1) as u16;
                self.scroll = (self.scroll + 1).min(max);
                None
            }

            // ===== System =====
            Message::OpenLibraryFolder => Some(Effect::OpenLibraryFolder),
            Message::Quit => {
                info!("Quit requested");
                self.running = false;
                None
            }
        }
    }

    fn handle_request(&mut self, capability: Capability) -> Option<Effect> {
        if self.is_busy() {
            debug!(%capability, activity = ?self.activity, "Ignoring button while busy");
            return None;
        }
        self.focus = match capability {
            Capability::Camera => Focus::TakePhoto,
            Capability::PhotoLibrary => Focus::ChoosePhoto,
        };
        self.activity = Activity::Authorizing(capability);
        Some(Effect::Authorize(capability))
    }

    fn handle_permission_resolved(
        &mut self,
        capability: Capability,
        granted: bool,
    ) -> Option<Effect> {
        if self.activity != Activity::Authorizing(capability) {
            warn!(%capability, "Stale permission result");
            return None;
        }

        if !granted {
            info!(%capability, "Permission denied");
            self.activity = Activity::Idle;
            self.show_error(&AppError::PermissionDenied(capability));
            return None;
        }

        let source = match capability {
            Capability::Camera => SourceKind::Camera,
            Capability::PhotoLibrary => SourceKind::Library,
        };
        self.activity = Activity::Picking(source);
        Some(Effect::Launch(capability))
    }

    fn handle_picker_finished(
        &mut self,
        source: SourceKind,
        result: Option<PickerResult>,
    ) -> Option<Effect> {
        self.activity = Activity::Idle;

        let Some(result) = result else {
            self.presenter.on_cancelled();
            return None;
        };

        // No image at all is treated like a cancel, without an alert
        let Some(media) = PickedMedia::from_result(source, result) else {
            debug!(error = %AppError::MediaMissing, "Dismissing picker");
            self.presenter.on_cancelled();
            return None;
        };

        let image = Arc::clone(&media.image);
        self.presenter.on_picked(media);
        self.scroll = 0;

        match source {
            SourceKind::Camera => Some(Effect::Save(self.presenter.save_ticket(), image)),
            SourceKind::Library => None,
        }
    }

    fn handle_saved(
        &mut self,
        ticket: SaveTicket,
        result: Result<PathBuf, AppError>,
    ) -> Option<Effect> {
        if let Some(alert) = self.presenter.on_saved(ticket, result) {
            self.alerts.push_back(alert);
        }
        None
    }

    fn show_error(&mut self, err: &AppError) {
        if let Some(alert) = err.alert() {
            self.alerts.push_back(alert);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Alert;
    use image::RgbaImage;

    fn image_result(width: u32, height: u32) -> PickerResult {
        PickerResult::from_image(RgbaImage::new(width, height))
    }

    fn granted(app: &mut AppModel, capability: Capability) {
        let request = match capability {
            Capability::Camera => Message::TakePhoto,
            Capability::PhotoLibrary => Message::ChoosePhoto,
        };
        assert!(matches!(app.update(request), Some(Effect::Authorize(c)) if c == capability));
        assert!(matches!(
            app.update(Message::PermissionResolved(capability, true)),
            Some(Effect::Launch(c)) if c == capability
        ));
    }

    #[test]
    fn test_denied_permission_shows_remediation() {
        let mut app = AppModel::new();
        app.update(Message::TakePhoto);
        let effect = app.update(Message::PermissionResolved(Capability::Camera, false));

        assert!(effect.is_none());
        assert_eq!(app.activity(), Activity::Idle);
        assert!(matches!(app.alert(), Some(Alert::Remediation { .. })));
        assert!(matches!(
            app.update(Message::OpenSettings),
            Some(Effect::OpenSettings)
        ));
        assert!(app.alert().is_none());
    }

    #[test]
    fn test_missing_camera_shows_info_alert() {
        let mut app = AppModel::new();
        granted(&mut app, Capability::Camera);
        app.update(Message::LaunchFailed(AppError::CapabilityUnavailable(
            "This device has no camera".into(),
        )));

        assert_eq!(app.activity(), Activity::Idle);
        assert_eq!(
            app.alert(),
            Some(&Alert::info("Unavailable", "This device has no camera"))
        );
    }

    #[test]
    fn test_library_selection_is_presented_without_saving() {
        let mut app = AppModel::new();
        granted(&mut app, Capability::PhotoLibrary);

        let result = PickerResult {
            file_path: Some("/home/me/Pictures/dog.jpg".into()),
            ..image_result(30, 20)
        };
        let effect = app.update(Message::PickerFinished(SourceKind::Library, Some(result)));

        assert!(effect.is_none());
        assert_eq!(
            app.display().description,
            "Source: library selection\nLocation: /home/me/Pictures/dog.jpg\nSize: 30 x 20"
        );
    }

    #[test]
    fn test_camera_capture_is_saved_then_relabelled() {
        let mut app = AppModel::new();
        granted(&mut app, Capability::Camera);

        let effect = app.update(Message::PickerFinished(
            SourceKind::Camera,
            Some(image_result(4, 2)),
        ));
        let Some(Effect::Save(ticket, image)) = effect else {
            panic!("camera capture should be saved");
        };
        assert_eq!(image.dimensions(), (4, 2));
        assert!(app.display().description.contains("in-memory image object"));

        app.update(Message::Saved(ticket, Ok("/lib/IMG_1.jpg".into())));
        assert!(app.display().description.contains("Location: saved to library"));
        assert!(app.alert().is_none());
    }

    #[test]
    fn test_failed_save_alerts_and_keeps_preview() {
        let mut app = AppModel::new();
        granted(&mut app, Capability::Camera);
        let Some(Effect::Save(ticket, image)) = app.update(Message::PickerFinished(
            SourceKind::Camera,
            Some(image_result(5, 5)),
        )) else {
            panic!("camera capture should be saved");
        };

        app.update(Message::Saved(
            ticket,
            Err(AppError::SaveFailed("No space left on device".into())),
        ));

        assert_eq!(
            app.alert(),
            Some(&Alert::info("Save Failed", "No space left on device"))
        );
        assert!(Arc::ptr_eq(app.display().image.as_ref().unwrap(), &image));
    }

    #[test]
    fn test_cancel_leaves_display_unchanged() {
        let mut app = AppModel::new();
        granted(&mut app, Capability::PhotoLibrary);
        app.update(Message::PickerFinished(
            SourceKind::Library,
            Some(image_result(7, 9)),
        ));
        let before = app.display().clone();

        granted(&mut app, Capability::PhotoLibrary);
        app.update(Message::PickerFinished(SourceKind::Library, None));

        assert_eq!(app.display(), &before);
        assert_eq!(app.activity(), Activity::Idle);
        assert!(app.alert().is_none());
    }

    #[test]
    fn test_result_without_image_is_silent_dismissal() {
        let mut app = AppModel::new();
        granted(&mut app, Capability::Camera);

        let effect = app.update(Message::PickerFinished(
            SourceKind::Camera,
            Some(PickerResult::default()),
        ));

        assert!(effect.is_none());
        assert!(app.display().image.is_none());
        assert!(app.alert().is_none());
        assert_eq!(app.activity(), Activity::Idle);
    }

    #[test]
    fn test_buttons_ignored_while_busy() {
        let mut app = AppModel::new();
        app.update(Message::TakePhoto);
        assert!(app.update(Message::ChoosePhoto).is_none());
        assert_eq!(app.activity(), Activity::Authorizing(Capability::Camera));
    }

    #[test]
    fn test_activate_presses_focused_button() {
        let mut app = AppModel::new();
        app.update(Message::FocusNext);
        assert_eq!(app.focus(), Focus::ChoosePhoto);
        assert!(matches!(
            app.update(Message::Activate),
            Some(Effect::Authorize(Capability::PhotoLibrary))
        ));
    }

    #[test]
    fn test_scroll_is_clamped_to_description() {
        let mut app = AppModel::new();
        granted(&mut app, Capability::PhotoLibrary);
        app.update(Message::PickerFinished(
            SourceKind::Library,
            Some(image_result(1, 1)),
        ));

        for _ in 0..10 {
            app.update(Message::ScrollDown);
        }
        assert_eq!(app.scroll(), 2);
        app.update(Message::ScrollUp);
        assert_eq!(app.scroll(), 1);
    }
}
