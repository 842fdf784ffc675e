// SPDX-License-Identifier: MPL-2.0

//! Picked media and the raw picker results it is built from

use crate::constants::{
    ASSET_ID_PREFIX, CAMERA_SOURCE_LABEL, IN_MEMORY_HINT, LIBRARY_SOURCE_LABEL,
};
use image::RgbaImage;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where an image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Library,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Camera => CAMERA_SOURCE_LABEL,
            SourceKind::Library => LIBRARY_SOURCE_LABEL,
        }
    }
}

/// Best-effort descriptor of where the image lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationHint {
    InMemory,
    Path(PathBuf),
    Asset(String),
}

impl fmt::Display for LocationHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationHint::InMemory => f.write_str(IN_MEMORY_HINT),
            LocationHint::Path(path) => write!(f, "{}", path.display()),
            LocationHint::Asset(id) => write!(f, "{}{}", ASSET_ID_PREFIX, id),
        }
    }
}

/// What a picker hands back on completion
///
/// Any field may be missing. Camera captures usually carry only the image.
#[derive(Debug, Clone, Default)]
pub struct PickerResult {
    pub image: Option<Arc<RgbaImage>>,
    pub file_path: Option<PathBuf>,
    pub asset_id: Option<String>,
}

impl PickerResult {
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image: Some(Arc::new(image)),
            ..Default::default()
        }
    }

    /// Location hint, preferring a direct path over an asset id
    pub fn location(&self) -> LocationHint {
        if let Some(path) = &self.file_path {
            LocationHint::Path(path.clone())
        } else if let Some(id) = &self.asset_id {
            LocationHint::Asset(id.clone())
        } else {
            LocationHint::InMemory
        }
    }
}

/// An acquired image ready for display
#[derive(Debug, Clone)]
pub struct PickedMedia {
    pub image: Arc<RgbaImage>,
    pub source: SourceKind,
    pub location: LocationHint,
}

impl PickedMedia {
    /// Build from a picker result; `None` when the picker gave no image
    pub fn from_result(source: SourceKind, result: PickerResult) -> Option<Self> {
        let location = result.location();
        let image = result.image?;
        Some(Self {
            image,
            source,
            location,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> RgbaImage {
        RgbaImage::new(1, 1)
    }

    #[test]
    fn test_path_is_used_verbatim() {
        let result = PickerResult {
            file_path: Some(PathBuf::from("/home/user/Pictures/a b.png")),
            asset_id: Some("ignored".into()),
            ..PickerResult::from_image(pixel())
        };
        assert_eq!(result.location().to_string(), "/home/user/Pictures/a b.png");
    }

    #[test]
    fn test_asset_id_is_prefixed() {
        let result = PickerResult {
            asset_id: Some("7F3A-11".into()),
            ..PickerResult::from_image(pixel())
        };
        assert_eq!(result.location().to_string(), "library asset id: 7F3A-11");
    }

    #[test]
    fn test_neither_falls_back_to_in_memory() {
        let result = PickerResult::from_image(pixel());
        assert_eq!(result.location(), LocationHint::InMemory);
        assert_eq!(result.location().to_string(), "in-memory image object");
    }

    #[test]
    fn test_missing_image_yields_no_media() {
        let result = PickerResult {
            file_path: Some(PathBuf::from("/tmp/x.png")),
            ..Default::default()
        };
        assert!(PickedMedia::from_result(SourceKind::Library, result).is_none());
    }
}
