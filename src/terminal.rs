// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front end
//!
//! Owns the UI loop. The loop is the only code that touches [`AppModel`];
//! platform work runs on a tokio runtime and reports back through a
//! channel that is drained at the start of every tick.

use crate::app::{AppModel, Effect, Message, view};
use crate::backends::camera::{V4l2Camera, Viewfinder};
use crate::backends::is_sandboxed;
use crate::backends::library::PhotoLibrary;
use crate::backends::permissions::{SystemPermissions, open_settings};
use crate::config::Settings;
use crate::constants::UI_TICK;
use crate::errors::{Alert, DeviceError};
use crate::launcher::{Launcher, Picker};
use crate::media::SourceKind;
use crate::permissions::authorize;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::channel::mpsc;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

/// Run the photo picker screen until the user quits
pub fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let services = Services::new(&settings);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, runtime.handle(), &services);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Platform collaborators shared by all effects
struct Services {
    permissions: Arc<SystemPermissions>,
    launcher: Launcher<V4l2Camera, PhotoLibrary>,
    library_dir: Option<PathBuf>,
    settings_command: Option<String>,
}

impl Services {
    fn new(settings: &Settings) -> Self {
        let library = PhotoLibrary::new(settings.library_dir.clone());
        let sandboxed = is_sandboxed();
        info!(
            camera = %settings.camera_device.display(),
            library = ?settings.library_dir,
            sandboxed,
            "Starting photo picker"
        );

        Self {
            permissions: Arc::new(SystemPermissions::new(
                settings.camera_device.clone(),
                Arc::new(library.clone()),
                sandboxed,
            )),
            launcher: Launcher::new(V4l2Camera::new(settings.camera_device.clone()), library),
            library_dir: settings.library_dir.clone(),
            settings_command: settings.settings_command.clone(),
        }
    }
}

/// Executes effects and holds the open camera picker
struct Runtime<'a> {
    handle: &'a Handle,
    services: &'a Services,
    sender: mpsc::UnboundedSender<Message>,
    viewfinder: Option<Viewfinder>,
}

impl Runtime<'_> {
    /// Feed a message to the app, running effects until none follow synchronously
    fn dispatch(&mut self, app: &mut AppModel, message: Message) {
        let mut pending = Some(message);
        while let Some(message) = pending.take() {
            if let Some(effect) = app.update(message) {
                pending = self.perform(effect);
            }
        }
    }

    fn perform(&mut self, effect: Effect) -> Option<Message> {
        match effect {
            Effect::Authorize(capability) => {
                let permissions = Arc::clone(&self.services.permissions);
                let sender = self.sender.clone();
                self.handle.spawn(async move {
                    let granted = authorize(&*permissions, capability).await;
                    let _ = sender.unbounded_send(Message::PermissionResolved(capability, granted));
                });
                None
            }
            Effect::Launch(capability) => match self.services.launcher.launch(capability) {
                Ok(Picker::Camera(viewfinder)) => {
                    self.viewfinder = Some(viewfinder);
                    None
                }
                Ok(Picker::Library(pending)) => {
                    let sender = self.sender.clone();
                    self.handle.spawn(async move {
                        let result = pending.await;
                        let _ = sender
                            .unbounded_send(Message::PickerFinished(SourceKind::Library, result));
                    });
                    None
                }
                Err(err) => Some(Message::LaunchFailed(err)),
            },
            Effect::Save(ticket, image) => {
                let saving = self.services.launcher.save(image);
                let sender = self.sender.clone();
                self.handle.spawn(async move {
                    let result = saving.await;
                    let _ = sender.unbounded_send(Message::Saved(ticket, result));
                });
                None
            }
            Effect::OpenSettings => {
                if let Err(e) = open_settings(self.services.settings_command.as_deref()) {
                    error!(error = %e, "Failed to open settings");
                }
                None
            }
            Effect::OpenLibraryFolder => {
                let Some(dir) = &self.services.library_dir else {
                    return None;
                };
                info!(path = %dir.display(), "Opening library folder");
                if let Err(e) = open::that_detached(dir) {
                    error!(error = %e, path = %dir.display(), "Failed to open library folder");
                }
                None
            }
        }
    }

    /// Close the camera picker, taking the current frame when `capture`
    fn close_viewfinder(&mut self, capture: bool) -> Option<Message> {
        let mut viewfinder = self.viewfinder.take()?;
        let result = capture.then(|| viewfinder.capture());
        drop(viewfinder);
        Some(Message::PickerFinished(SourceKind::Camera, result))
    }
}

/// Drain viewfinder frames, closing the picker if its device went away
fn poll_viewfinder(viewfinder: &mut Option<Viewfinder>) -> Option<Message> {
    let open = viewfinder.as_mut()?;
    open.poll();
    if !open.is_lost() {
        return None;
    }

    warn!("Camera stopped while the viewfinder was open");
    *viewfinder = None;
    let err = DeviceError::Disconnected("no frames from the device".into());
    Some(Message::LaunchFailed(err.into()))
}

/// What a key press means in the current state
#[derive(Debug)]
enum Input {
    App(Message),
    Capture,
    CancelCapture,
}

fn map_key(app: &AppModel, viewfinder_open: bool, key: KeyEvent) -> Option<Input> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Input::App(Message::Quit));
    }

    if let Some(alert) = app.alert() {
        let message = match (alert, key.code) {
            (Alert::Info { .. }, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) => {
                Message::DismissAlert
            }
            (Alert::Remediation { .. }, KeyCode::Enter | KeyCode::Char('s')) => {
                Message::OpenSettings
            }
            (Alert::Remediation { .. }, KeyCode::Esc | KeyCode::Char('n')) => {
                Message::DismissAlert
            }
            _ => return None,
        };
        return Some(Input::App(message));
    }

    if viewfinder_open {
        return match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Input::Capture),
            KeyCode::Esc => Some(Input::CancelCapture),
            _ => None,
        };
    }

    let message = match key.code {
        KeyCode::Char('t') => Message::TakePhoto,
        KeyCode::Char('c') => Message::ChoosePhoto,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => Message::FocusNext,
        KeyCode::Enter | KeyCode::Char(' ') => Message::Activate,
        KeyCode::Up | KeyCode::PageUp | KeyCode::Char('k') => Message::ScrollUp,
        KeyCode::Down | KeyCode::PageDown | KeyCode::Char('j') => Message::ScrollDown,
        KeyCode::Char('o') => Message::OpenLibraryFolder,
        KeyCode::Char('q') | KeyCode::Esc => Message::Quit,
        _ => return None,
    };
    Some(Input::App(message))
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: &Handle,
    services: &Services,
) -> Result<(), Box<dyn std::error::Error>> {
    let (sender, mut receiver) = mpsc::unbounded::<Message>();
    let mut runtime = Runtime {
        handle,
        services,
        sender,
        viewfinder: None,
    };
    let mut app = AppModel::new();

    while app.is_running() {
        // Results of background work land here, on the UI thread
        while let Ok(message) = receiver.try_recv() {
            runtime.dispatch(&mut app, message);
        }

        if let Some(message) = poll_viewfinder(&mut runtime.viewfinder) {
            runtime.dispatch(&mut app, message);
        }
        let live = runtime
            .viewfinder
            .as_ref()
            .and_then(|viewfinder| viewfinder.latest())
            .cloned();

        terminal.draw(|f| view::draw(f, &app, live.as_deref()))?;

        if event::poll(UI_TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let message = match map_key(&app, runtime.viewfinder.is_some(), key) {
                Some(Input::App(message)) => Some(message),
                Some(Input::Capture) => runtime.close_viewfinder(true),
                Some(Input::CancelCapture) => runtime.close_viewfinder(false),
                None => None,
            };
            if let Some(message) = message {
                runtime.dispatch(&mut app, message);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::permissions::Capability;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_lost_camera_closes_viewfinder_with_alert() {
        let (sender, receiver) = mpsc::channel(1);
        let mut viewfinder = Some(Viewfinder::from_receiver(receiver));
        assert!(poll_viewfinder(&mut viewfinder).is_none());

        drop(sender);
        let message = poll_viewfinder(&mut viewfinder);

        assert!(viewfinder.is_none());
        let mut app = AppModel::new();
        app.update(Message::TakePhoto);
        app.update(Message::PermissionResolved(Capability::Camera, true));
        app.update(message.unwrap());
        assert_eq!(app.activity(), crate::app::Activity::Idle);
        assert_eq!(app.alert().map(|a| a.title()), Some("Unavailable"));
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(
            map_key(&AppModel::new(), true, key),
            Some(Input::App(Message::Quit))
        ));
    }

    #[test]
    fn test_buttons_map_to_requests() {
        let app = AppModel::new();
        assert!(matches!(
            map_key(&app, false, press(KeyCode::Char('t'))),
            Some(Input::App(Message::TakePhoto))
        ));
        assert!(matches!(
            map_key(&app, false, press(KeyCode::Char('c'))),
            Some(Input::App(Message::ChoosePhoto))
        ));
    }

    #[test]
    fn test_viewfinder_keys_capture_or_cancel() {
        let app = AppModel::new();
        assert!(matches!(
            map_key(&app, true, press(KeyCode::Char(' '))),
            Some(Input::Capture)
        ));
        assert!(matches!(
            map_key(&app, true, press(KeyCode::Esc)),
            Some(Input::CancelCapture)
        ));
        assert!(map_key(&app, true, press(KeyCode::Char('t'))).is_none());
    }

    #[test]
    fn test_remediation_alert_keys() {
        let mut app = AppModel::new();
        app.update(Message::TakePhoto);
        app.update(Message::PermissionResolved(Capability::Camera, false));

        assert!(matches!(
            map_key(&app, false, press(KeyCode::Enter)),
            Some(Input::App(Message::OpenSettings))
        ));
        assert!(matches!(
            map_key(&app, false, press(KeyCode::Esc)),
            Some(Input::App(Message::DismissAlert))
        ));
        // Buttons are inert under an alert
        assert!(map_key(&app, false, press(KeyCode::Char('t'))).is_none());
    }

    #[test]
    fn test_info_alert_is_acknowledged() {
        let mut app = AppModel::new();
        app.update(Message::TakePhoto);
        app.update(Message::PermissionResolved(Capability::Camera, true));
        app.update(Message::LaunchFailed(AppError::CapabilityUnavailable(
            "no camera".into(),
        )));

        assert!(matches!(
            map_key(&app, false, press(KeyCode::Enter)),
            Some(Input::App(Message::DismissAlert))
        ));
    }
}
