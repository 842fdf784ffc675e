// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing capture devices
//! - Reporting permission state without prompting

use photo_picker::backends::camera::{V4l2Camera, list_devices};
use photo_picker::backends::is_sandboxed;
use photo_picker::backends::library::PhotoLibrary;
use photo_picker::backends::permissions::SystemPermissions;
use photo_picker::config::Settings;
use photo_picker::launcher::CameraSource;
use photo_picker::permissions::{Capability, Gate, PermissionService, gate};
use std::sync::Arc;

/// List all video capture devices
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = list_devices();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for camera in &cameras {
        println!("  {}  {} ({})", camera.path.display(), camera.name, camera.driver);
    }

    Ok(())
}

/// Print each capability's permission state
pub fn print_status(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let library = Arc::new(PhotoLibrary::new(settings.library_dir.clone()));
    let sandboxed = is_sandboxed();
    let permissions =
        SystemPermissions::new(settings.camera_device.clone(), Arc::clone(&library), sandboxed);

    let rt = tokio::runtime::Runtime::new()?;
    let states = rt.block_on(async {
        let mut states = Vec::new();
        for capability in Capability::ALL {
            states.push((capability, permissions.status(capability).await));
        }
        states
    });

    if sandboxed {
        println!("Running sandboxed: camera access goes through the desktop portal");
        println!();
    }

    for (capability, state) in states {
        let next = match gate(state, capability) {
            Gate::Proceed => "ready",
            Gate::Prompt => "will ask on first use",
            Gate::Denied => "blocked, change it in system settings",
        };
        println!("  {:<14} {:<15} {}", capability.display_name(), state.to_string(), next);
    }

    let camera = V4l2Camera::new(settings.camera_device.clone());
    println!();
    println!(
        "  camera device  {} ({})",
        camera.path().display(),
        if camera.is_available() { "present" } else { "missing" }
    );
    match library.root() {
        Some(root) => println!("  library folder {}", root.display()),
        None => println!("  library folder (no pictures directory)"),
    }

    Ok(())
}
