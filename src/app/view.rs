// SPDX-License-Identifier: GPL-3.0-only

//! Screen layout
//!
//! ```text
//! ┌ Take Photo ┐ ┌ Choose Photo ┐
//! ┌ Preview ─────────────────────┐
//! │  half-block image            │
//! └──────────────────────────────┘
//! ┌ Details ─────────────────────┐
//! │ Source / Location / Size     │
//! └──────────────────────────────┘
//!  status bar
//! ```

use crate::app::state::{Activity, AppModel, Focus};
use crate::constants::{CHOOSE_PHOTO_LABEL, TAKE_PHOTO_LABEL};
use crate::errors::Alert;
use crate::media::SourceKind;
use image::RgbaImage;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

/// Draw the whole screen
///
/// `live` is the newest viewfinder frame while the camera picker is open.
pub fn draw(frame: &mut Frame, app: &AppModel, live: Option<&RgbaImage>) {
    let [buttons_area, preview_area, details_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(6),
        Constraint::Length(5),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_buttons(frame, app, buttons_area);

    let (title, image, placeholder) = match live {
        Some(image) => (" Camera ", Some(image), "Waiting for camera..."),
        None if app.activity() == Activity::Picking(SourceKind::Camera) => {
            (" Camera ", None, "Waiting for camera...")
        }
        None => (
            " Preview ",
            app.display().image.as_deref(),
            "No image selected",
        ),
    };
    let preview_block = Block::bordered().title(title);
    let inner = preview_block.inner(preview_area);
    frame.render_widget(preview_block, preview_area);
    frame.render_widget(ImageWidget { image, placeholder }, inner);

    let details = Paragraph::new(app.display().description.as_str())
        .block(Block::bordered().title(" Details "))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll(), 0));
    frame.render_widget(details, details_area);

    frame.render_widget(
        StatusBar {
            message: &status_message(app, live.is_some()),
        },
        status_area,
    );

    if let Some(alert) = app.alert() {
        draw_alert(frame, alert);
    }
}

fn draw_buttons(frame: &mut Frame, app: &AppModel, area: Rect) {
    let [take_area, choose_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    for (label, focus, area) in [
        (TAKE_PHOTO_LABEL, Focus::TakePhoto, take_area),
        (CHOOSE_PHOTO_LABEL, Focus::ChoosePhoto, choose_area),
    ] {
        let style = if app.is_busy() {
            Style::default().fg(Color::DarkGray)
        } else if app.focus() == focus {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let button = Paragraph::new(label)
            .centered()
            .style(style)
            .block(Block::bordered());
        frame.render_widget(button, area);
    }
}

fn draw_alert(frame: &mut Frame, alert: &Alert) {
    let hint = match alert {
        Alert::Info { .. } => "[Enter] OK",
        Alert::Remediation { .. } => "[Esc] Cancel   [Enter/s] Go to Settings",
    };
    let text = format!("{}\n\n{}", alert.message(), hint);

    let area = centered(frame.area(), 60, 7);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .centered()
            .block(
                Block::bordered()
                    .title(format!(" {} ", alert.title()))
                    .border_style(Style::default().fg(Color::Yellow)),
            ),
        area,
    );
}

fn status_message(app: &AppModel, viewfinder_open: bool) -> String {
    if app.alert().is_some() {
        return String::new();
    }
    match app.activity() {
        Activity::Picking(SourceKind::Camera) if viewfinder_open => {
            "[Space/Enter] capture | [Esc] cancel".to_string()
        }
        Activity::Picking(SourceKind::Camera) => "Opening camera...".to_string(),
        Activity::Picking(SourceKind::Library) => "Waiting for the file chooser...".to_string(),
        Activity::Authorizing(capability) => {
            format!("Requesting access to the {}...", capability.display_name())
        }
        Activity::Idle => {
            "'t' take photo | 'c' choose photo | Tab/Enter buttons | j/k scroll | 'o' library | 'q' quit"
                .to_string()
        }
    }
}

/// Rect of at most `width` x `height` centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Renders an image using half-block characters
///
/// Each terminal cell shows two vertical pixels: the upper half (`▀`) in the
/// foreground color and the lower half in the background color.
struct ImageWidget<'a> {
    image: Option<&'a RgbaImage>,
    placeholder: &'a str,
}

impl Widget for ImageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let Some(image) = self.image.filter(|img| img.width() > 0 && img.height() > 0) else {
            let msg = self.placeholder;
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            buf.set_string(x, y, msg, Style::default().fg(Color::DarkGray));
            return;
        };

        let (display_width, display_height) =
            fit(image.width(), image.height(), area.width, area.height);
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width - display_width) / 2;
        let y_offset = area.y + (area.height - display_height) / 2;

        let x_scale = image.width() as f64 / display_width as f64;
        let y_scale = image.height() as f64 / (display_height as f64 * 2.0);

        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(sample(image, src_x, src_y_top));
                    cell.set_bg(sample(image, src_x, src_y_bottom));
                }
            }
        }
    }
}

/// Cell size of an image fitted into `cols` x `rows` keeping its aspect
///
/// Rows hold two pixels each.
fn fit(width: u32, height: u32, cols: u16, rows: u16) -> (u16, u16) {
    let aspect = width as f64 / height as f64;
    let term_width = cols as f64;
    let term_height = rows as f64 * 2.0;

    if term_width / term_height > aspect {
        let w = (term_height * aspect).round() as u16;
        (w.min(cols), rows)
    } else {
        let h = (term_width / aspect / 2.0).round() as u16;
        (cols, h.min(rows))
    }
}

fn sample(image: &RgbaImage, x: u32, y: u32) -> Color {
    let x = x.min(image.width() - 1);
    let y = y.min(image.height() - 1);
    let [r, g, b, _] = image.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::White).bg(Color::DarkGray);
        buf.set_style(area, style);

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, style);
    }
}
