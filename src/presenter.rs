// SPDX-License-Identifier: MPL-2.0

//! Result presenter
//!
//! Owns the [`DisplayState`] (preview image and description text) and is the
//! only thing that mutates it.

use crate::constants::{PLACEHOLDER_DESCRIPTION, SAVED_TO_LIBRARY_HINT};
use crate::errors::{Alert, AppError};
use crate::media::{PickedMedia, SourceKind};
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives the outcome of a picker
pub trait PickerDelegate {
    fn on_picked(&mut self, media: PickedMedia);
    fn on_cancelled(&mut self);
}

/// What the screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub image: Option<Arc<RgbaImage>>,
    pub description: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            image: None,
            description: PLACEHOLDER_DESCRIPTION.to_string(),
        }
    }
}

/// Identifies the image a pending library save belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket(u64);

/// Metadata of the image on screen, kept so the description can be redrawn
#[derive(Debug, Clone)]
struct Shown {
    source: SourceKind,
    location: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Default)]
pub struct Presenter {
    state: DisplayState,
    shown: Option<Shown>,
    generation: u64,
}

/// Compose the three description lines
pub fn describe(source: SourceKind, location: &str, width: u32, height: u32) -> String {
    format!(
        "Source: {}\nLocation: {}\nSize: {} x {}",
        source.label(),
        location,
        width,
        height
    )
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Ticket for the image currently on screen
    pub fn save_ticket(&self) -> SaveTicket {
        SaveTicket(self.generation)
    }

    /// Apply the outcome of writing a capture to the library
    ///
    /// Success relabels the location only if the saved image is still the
    /// one on screen. Failure always alerts and never touches the preview.
    pub fn on_saved(
        &mut self,
        ticket: SaveTicket,
        result: Result<PathBuf, AppError>,
    ) -> Option<Alert> {
        match result {
            Ok(path) => {
                info!(path = %path.display(), "Capture saved to library");
                if ticket != self.save_ticket() {
                    debug!("Saved image is no longer on screen");
                    return None;
                }
                if let Some(shown) = &mut self.shown {
                    shown.location = SAVED_TO_LIBRARY_HINT.to_string();
                }
                self.refresh_description();
                None
            }
            Err(err) => {
                warn!(error = %err, "Failed to save capture to library");
                err.alert()
            }
        }
    }

    fn refresh_description(&mut self) {
        if let Some(shown) = &self.shown {
            self.state.description =
                describe(shown.source, &shown.location, shown.width, shown.height);
        }
    }
}

impl PickerDelegate for Presenter {
    fn on_picked(&mut self, media: PickedMedia) {
        let (width, height) = media.dimensions();
        info!(
            source = media.source.label(),
            location = %media.location,
            width,
            height,
            "Presenting image"
        );

        self.generation += 1;
        self.shown = Some(Shown {
            source: media.source,
            location: media.location.to_string(),
            width,
            height,
        });
        self.state.image = Some(media.image);
        self.refresh_description();
    }

    fn on_cancelled(&mut self) {
        debug!("Picker cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::LocationHint;

    fn media(source: SourceKind, location: LocationHint, width: u32, height: u32) -> PickedMedia {
        PickedMedia {
            image: Arc::new(RgbaImage::new(width, height)),
            source,
            location,
        }
    }

    #[test]
    fn test_initial_state_is_placeholder() {
        let presenter = Presenter::new();
        assert!(presenter.state().image.is_none());
        assert_eq!(presenter.state().description, PLACEHOLDER_DESCRIPTION);
    }

    #[test]
    fn test_description_has_three_ordered_lines() {
        let mut presenter = Presenter::new();
        presenter.on_picked(media(
            SourceKind::Library,
            LocationHint::Path("/pics/cat.png".into()),
            640,
            480,
        ));

        let lines: Vec<&str> = presenter.state().description.lines().collect();
        assert_eq!(
            lines,
            [
                "Source: library selection",
                "Location: /pics/cat.png",
                "Size: 640 x 480",
            ]
        );
    }

    #[test]
    fn test_successful_save_overrides_location() {
        let mut presenter = Presenter::new();
        presenter.on_picked(media(SourceKind::Camera, LocationHint::InMemory, 4, 3));
        assert!(presenter.state().description.contains("in-memory image object"));

        let ticket = presenter.save_ticket();
        let alert = presenter.on_saved(ticket, Ok("/pics/IMG_1.jpg".into()));

        assert!(alert.is_none());
        let lines: Vec<&str> = presenter.state().description.lines().collect();
        assert_eq!(lines[0], "Source: camera capture");
        assert_eq!(lines[1], "Location: saved to library");
        assert_eq!(lines[2], "Size: 4 x 3");
    }

    #[test]
    fn test_failed_save_alerts_and_keeps_preview() {
        let mut presenter = Presenter::new();
        let captured = media(SourceKind::Camera, LocationHint::InMemory, 8, 8);
        let image = Arc::clone(&captured.image);
        presenter.on_picked(captured);

        let ticket = presenter.save_ticket();
        let alert = presenter.on_saved(ticket, Err(AppError::SaveFailed("read-only".into())));

        assert_eq!(alert, Some(Alert::info("Save Failed", "read-only")));
        assert!(Arc::ptr_eq(presenter.state().image.as_ref().unwrap(), &image));
        assert!(presenter.state().description.contains("in-memory image object"));
    }

    #[test]
    fn test_stale_save_does_not_relabel_newer_image() {
        let mut presenter = Presenter::new();
        presenter.on_picked(media(SourceKind::Camera, LocationHint::InMemory, 2, 2));
        let ticket = presenter.save_ticket();

        presenter.on_picked(media(
            SourceKind::Library,
            LocationHint::Asset("42".into()),
            2,
            2,
        ));
        presenter.on_saved(ticket, Ok("/pics/IMG_2.jpg".into()));

        assert!(
            presenter
                .state()
                .description
                .contains("Location: library asset id: 42")
        );
    }

    #[test]
    fn test_cancel_leaves_state_unchanged() {
        let mut presenter = Presenter::new();
        presenter.on_picked(media(SourceKind::Library, LocationHint::InMemory, 3, 5));
        let before = presenter.state().clone();

        presenter.on_cancelled();

        assert_eq!(presenter.state(), &before);
    }
}
