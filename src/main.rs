// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use photo_picker::config::Settings;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

mod cli;

#[derive(Parser)]
#[command(name = "photo-picker")]
#[command(about = "Take a photo or choose one from your library")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Options {
    /// Camera device used by "Take Photo"
    #[arg(short, long, global = true)]
    device: Option<PathBuf>,

    /// Photo library folder (default: ~/Pictures/photo-picker)
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    /// Command run by "Go to Settings", e.g. "gnome-control-center privacy"
    #[arg(long, global = true)]
    settings_command: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show camera and photo library permission state
    Status,

    /// List available cameras
    List,
}

impl Options {
    fn into_settings(self) -> Settings {
        let defaults = Settings::default();
        Settings {
            camera_device: self.device.unwrap_or(defaults.camera_device),
            library_dir: self.library.or(defaults.library_dir),
            settings_command: self.settings_command,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = cli.options.into_settings();

    match cli.command {
        Some(Commands::Status) => {
            init_logging(false);
            cli::print_status(&settings)
        }
        Some(Commands::List) => {
            init_logging(false);
            cli::list_cameras()
        }
        None => {
            init_logging(true);
            photo_picker::terminal::run(settings)
        }
    }
}

/// Initialize logging
///
/// Set RUST_LOG environment variable to control log level
/// Examples: RUST_LOG=debug, RUST_LOG=photo_picker=debug, RUST_LOG=info
///
/// With `to_file` set, logs go to the cache directory so they never draw
/// over the screen. If that file cannot be opened, one line on stderr says
/// so before the screen takes over and logging is discarded.
fn init_logging(to_file: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true);

    if !to_file {
        builder.init();
        return;
    }

    match open_log_file(Settings::log_file()) {
        Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Err(e) => {
            eprintln!("photo-picker: logging disabled, cannot open log file: {}", e);
            builder.with_writer(std::io::sink).init();
        }
    }
}

/// Open `path` for appending, creating its directory
fn open_log_file(path: Option<PathBuf>) -> io::Result<File> {
    let path = path.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no cache directory"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
