// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::errors::{Alert, AppError};
use crate::media::{PickerResult, SourceKind};
use crate::permissions::Capability;
use crate::presenter::{DisplayState, Presenter, SaveTicket};
use image::RgbaImage;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

/// What the app is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    /// Gatekeeper is resolving (possibly showing a prompt)
    Authorizing(Capability),
    /// A picker is on screen
    Picking(SourceKind),
}

/// Which button has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    TakePhoto,
    ChoosePhoto,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::TakePhoto => Focus::ChoosePhoto,
            Focus::ChoosePhoto => Focus::TakePhoto,
        }
    }
}

/// Messages that drive the app
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Buttons =====
    /// "Take Photo" pressed
    TakePhoto,
    /// "Choose Photo" pressed
    ChoosePhoto,
    /// Move focus to the other button
    FocusNext,
    /// Press the focused button
    Activate,

    // ===== Acquisition =====
    /// Gatekeeper outcome for a capability
    PermissionResolved(Capability, bool),
    /// The picker could not be presented
    LaunchFailed(AppError),
    /// Picker closed; `None` when cancelled
    PickerFinished(SourceKind, Option<PickerResult>),
    /// Library write of a camera capture finished
    Saved(SaveTicket, Result<PathBuf, AppError>),

    // ===== Alerts =====
    /// Acknowledge / cancel the front alert
    DismissAlert,
    /// "Go to Settings" on a remediation alert
    OpenSettings,

    // ===== Description =====
    ScrollUp,
    ScrollDown,

    // ===== System =====
    /// Show the library folder in the file manager
    OpenLibraryFolder,
    Quit,
}

/// Side effects requested by [`AppModel::update`], run by the terminal runtime
#[derive(Debug, Clone)]
pub enum Effect {
    /// Run the gatekeeper for a capability
    Authorize(Capability),
    /// Present the picker for a granted capability
    Launch(Capability),
    /// Write a camera capture to the library
    Save(SaveTicket, Arc<RgbaImage>),
    OpenSettings,
    OpenLibraryFolder,
}

/// The whole screen's state
#[derive(Debug, Default)]
pub struct AppModel {
    pub(crate) presenter: Presenter,
    pub(crate) activity: Activity,
    pub(crate) focus: Focus,
    pub(crate) alerts: VecDeque<Alert>,
    pub(crate) scroll: u16,
    pub(crate) running: bool,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    pub fn display(&self) -> &DisplayState {
        self.presenter.state()
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// The alert currently shown, if any
    pub fn alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Buttons accept presses only when nothing else is going on
    pub fn is_busy(&self) -> bool {
        self.activity != Activity::Idle || !self.alerts.is_empty()
    }
}
