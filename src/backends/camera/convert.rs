// SPDX-License-Identifier: GPL-3.0-only
//! Frame decoding for the viewfinder
//!
//! Turns raw V4L2 buffers into RGBA images. Only the two formats virtually
//! every UVC webcam offers are handled: MJPEG and packed YUYV 4:2:2.

use crate::errors::DeviceError;
use image::{ImageFormat, RgbaImage};
use v4l::FourCC;

pub const MJPG: FourCC = FourCC { repr: *b"MJPG" };
pub const YUYV: FourCC = FourCC { repr: *b"YUYV" };

/// Formats the viewfinder can decode, in order of preference
pub const SUPPORTED_FOURCCS: [FourCC; 2] = [MJPG, YUYV];

/// Decode one buffer of the negotiated format
pub fn decode_frame(
    data: &[u8],
    fourcc: FourCC,
    width: u32,
    height: u32,
    stride: u32,
) -> Result<RgbaImage, DeviceError> {
    if fourcc == MJPG {
        image::load_from_memory_with_format(data, ImageFormat::Jpeg)
            .map(|img| img.into_rgba8())
            .map_err(|e| DeviceError::UnsupportedFormat(format!("corrupt MJPEG frame: {}", e)))
    } else if fourcc == YUYV {
        yuyv_to_rgba(data, width, height, stride)
    } else {
        Err(DeviceError::UnsupportedFormat(fourcc.to_string()))
    }
}

/// Convert YUYV (YUV 4:2:2) to RGBA
///
/// YUYV format: Y0 U Y1 V - each 4-byte group encodes 2 pixels.
/// `stride` is the byte length of one row, 0 meaning tightly packed.
/// An odd width still carries a whole last group; its second pixel is padding.
pub fn yuyv_to_rgba(
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
) -> Result<RgbaImage, DeviceError> {
    let row_bytes = (width as usize).div_ceil(2) * 4;
    let stride = if stride == 0 { row_bytes } else { stride as usize };
    if data.len() < stride * (height as usize).saturating_sub(1) + row_bytes {
        return Err(DeviceError::UnsupportedFormat(format!(
            "short YUYV frame: {} bytes for {}x{}",
            data.len(),
            width,
            height
        )));
    }

    let mut rgba = RgbaImage::new(width, height);
    for y in 0..height {
        let row = &data[y as usize * stride..][..row_bytes];
        for (pair, chunk) in row.chunks_exact(4).enumerate() {
            let (r0, g0, b0) = yuv_to_rgb(chunk[0], chunk[1], chunk[3]);
            let (r1, g1, b1) = yuv_to_rgb(chunk[2], chunk[1], chunk[3]);
            let x = pair as u32 * 2;
            rgba.put_pixel(x, y, image::Rgba([r0, g0, b0, 255]));
            if x + 1 < width {
                rgba.put_pixel(x + 1, y, image::Rgba([r1, g1, b1, 255]));
            }
        }
    }

    Ok(rgba)
}

/// Convert YUV (BT.601) to RGB
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}
