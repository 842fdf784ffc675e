// SPDX-License-Identifier: GPL-3.0-only

//! Live camera preview
//!
//! A capture thread streams decoded frames into a bounded channel. The UI
//! drains the channel every tick and keeps only the newest frame; capturing
//! a photo simply takes that frame. A device that keeps failing ends the
//! thread, which closes the channel and marks the viewfinder as lost.

use super::convert::decode_frame;
use crate::constants::{
    CAPTURE_BUFFER_COUNT, CAPTURE_RETRY_DELAY, FRAME_CHANNEL_CAPACITY, MAX_CAPTURE_ERRORS,
};
use crate::errors::DeviceError;
use crate::media::PickerResult;
use futures::channel::mpsc;
use futures::{FutureExt, StreamExt};
use image::RgbaImage;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};
use v4l::Format;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;

pub type Frame = Arc<RgbaImage>;

pub struct Viewfinder {
    receiver: mpsc::Receiver<Frame>,
    latest: Option<Frame>,
    lost: bool,
    stop_signal: Arc<AtomicBool>,
    capture_thread: Option<JoinHandle<()>>,
}

impl Viewfinder {
    /// Viewfinder fed by an external frame source
    pub fn from_receiver(receiver: mpsc::Receiver<Frame>) -> Self {
        Self {
            receiver,
            latest: None,
            lost: false,
            stop_signal: Arc::new(AtomicBool::new(false)),
            capture_thread: None,
        }
    }

    /// Start streaming from an opened, configured device
    pub(super) fn start(device: Device, format: Format) -> Result<Self, DeviceError> {
        let (sender, receiver) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let mut viewfinder = Self::from_receiver(receiver);
        let stop_signal = Arc::clone(&viewfinder.stop_signal);

        let handle = std::thread::Builder::new()
            .name("viewfinder".into())
            .spawn(move || {
                if let Err(e) = capture_loop(device, format, stop_signal, sender) {
                    error!(error = %e, "Viewfinder capture stopped");
                }
            })?;

        viewfinder.capture_thread = Some(handle);
        Ok(viewfinder)
    }

    /// Pull pending frames, keeping the newest. Returns true if one arrived.
    pub fn poll(&mut self) -> bool {
        let mut updated = false;
        while !self.lost {
            match self.receiver.next().now_or_never() {
                Some(Some(frame)) => {
                    self.latest = Some(frame);
                    updated = true;
                }
                // The frame source is gone and will not send again
                Some(None) => self.lost = true,
                None => break,
            }
        }
        updated
    }

    /// Whether the frame source has stopped for good
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn latest(&self) -> Option<&Frame> {
        self.latest.as_ref()
    }

    /// Take the current frame as the captured photo
    ///
    /// Before the first frame arrives this yields a result without an image.
    pub fn capture(&mut self) -> PickerResult {
        self.poll();
        PickerResult {
            image: self.latest.take(),
            ..Default::default()
        }
    }
}

impl Drop for Viewfinder {
    fn drop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        self.receiver.close();
        // A thread stuck waiting on the device must not hold up the UI;
        // it sees the stop signal or the closed channel once it wakes
        if let Some(handle) = self.capture_thread.take() {
            if handle.is_finished() {
                let _ = handle.join();
                debug!("Viewfinder capture thread joined");
            } else {
                debug!("Viewfinder capture thread detached");
            }
        }
    }
}

fn capture_loop(
    device: Device,
    format: Format,
    stop_signal: Arc<AtomicBool>,
    sender: mpsc::Sender<Frame>,
) -> Result<(), DeviceError> {
    let mut stream = Stream::with_buffers(&device, Type::VideoCapture, CAPTURE_BUFFER_COUNT)
        .map_err(|e| DeviceError::OpenFailed(format!("failed to create stream: {}", e)))?;

    info!(
        width = format.width,
        height = format.height,
        fourcc = %format.fourcc,
        "Viewfinder streaming"
    );

    pump(
        || {
            let (buf, meta) = stream.next()?;
            let used = (meta.bytesused as usize).min(buf.len());
            let used = if used == 0 { buf.len() } else { used };
            match decode_frame(
                &buf[..used],
                format.fourcc,
                format.width,
                format.height,
                format.stride,
            ) {
                Ok(frame) => Ok(Some(frame)),
                Err(e) => {
                    debug!(error = %e, "Dropping undecodable frame");
                    Ok(None)
                }
            }
        },
        &stop_signal,
        sender,
    )
}

/// Forward frames from `next_frame` until stopped, disconnected or failing
///
/// `next_frame` yields `Ok(None)` for a buffer that was read but is not
/// worth showing. After [`MAX_CAPTURE_ERRORS`] failed reads in a row the
/// device is given up on; dropping `sender` then tells the UI.
fn pump(
    mut next_frame: impl FnMut() -> io::Result<Option<RgbaImage>>,
    stop_signal: &AtomicBool,
    mut sender: mpsc::Sender<Frame>,
) -> Result<(), DeviceError> {
    let mut failures = 0;

    while !stop_signal.load(Ordering::SeqCst) {
        let frame = match next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                failures = 0;
                continue;
            }
            Err(e) => {
                failures += 1;
                if failures >= MAX_CAPTURE_ERRORS {
                    return Err(DeviceError::Disconnected(e.to_string()));
                }
                warn!(error = %e, failures, "Failed to capture frame");
                std::thread::sleep(CAPTURE_RETRY_DELAY);
                continue;
            }
        };
        failures = 0;

        if let Err(e) = sender.try_send(Arc::new(frame)) {
            if e.is_disconnected() {
                break;
            }
            // Full: the UI has not caught up, drop this frame
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_keeps_newest_frame() {
        let (mut sender, receiver) = mpsc::channel(4);
        let mut viewfinder = Viewfinder::from_receiver(receiver);
        assert!(!viewfinder.poll());

        sender.try_send(Arc::new(RgbaImage::new(1, 1))).unwrap();
        sender.try_send(Arc::new(RgbaImage::new(2, 2))).unwrap();

        assert!(viewfinder.poll());
        assert_eq!(viewfinder.latest().unwrap().dimensions(), (2, 2));
    }

    #[test]
    fn test_capture_before_first_frame_has_no_image() {
        let (_sender, receiver) = mpsc::channel(1);
        let mut viewfinder = Viewfinder::from_receiver(receiver);
        let result = viewfinder.capture();
        assert!(result.image.is_none());
        assert!(result.file_path.is_none());
    }

    #[test]
    fn test_failing_device_gives_up_and_closes_channel() {
        let (sender, receiver) = mpsc::channel(1);
        let mut viewfinder = Viewfinder::from_receiver(receiver);
        let mut reads = 0;

        let err = pump(
            || {
                reads += 1;
                Err(io::Error::other("No such device"))
            },
            &AtomicBool::new(false),
            sender,
        )
        .unwrap_err();

        assert!(matches!(err, DeviceError::Disconnected(_)));
        assert_eq!(reads, MAX_CAPTURE_ERRORS);
        assert!(!viewfinder.poll());
        assert!(viewfinder.is_lost());
    }

    #[test]
    fn test_recovered_read_resets_failure_count() {
        let (sender, receiver) = mpsc::channel(4);
        let mut viewfinder = Viewfinder::from_receiver(receiver);
        let stop = AtomicBool::new(false);
        let mut reads = 0;

        // Alternate failures with good frames, stopping after a while
        pump(
            || {
                reads += 1;
                if reads == 3 * MAX_CAPTURE_ERRORS {
                    stop.store(true, Ordering::SeqCst);
                }
                if reads % 2 == 0 {
                    Ok(Some(RgbaImage::new(3, 3)))
                } else {
                    Err(io::Error::other("timeout"))
                }
            },
            &stop,
            sender,
        )
        .unwrap();

        assert!(viewfinder.poll());
        assert_eq!(viewfinder.latest().unwrap().dimensions(), (3, 3));
    }

    #[test]
    fn test_dropped_sender_marks_viewfinder_lost() {
        let (mut sender, receiver) = mpsc::channel(1);
        let mut viewfinder = Viewfinder::from_receiver(receiver);
        sender.try_send(Arc::new(RgbaImage::new(5, 5))).unwrap();
        drop(sender);

        assert!(viewfinder.poll());
        assert!(viewfinder.is_lost());
        // The last frame can still be captured
        assert_eq!(viewfinder.capture().image.unwrap().dimensions(), (5, 5));
    }

    #[test]
    fn test_capture_takes_latest_frame() {
        let (mut sender, receiver) = mpsc::channel(1);
        let mut viewfinder = Viewfinder::from_receiver(receiver);
        sender.try_send(Arc::new(RgbaImage::new(4, 3))).unwrap();

        let result = viewfinder.capture();
        assert_eq!(result.image.unwrap().dimensions(), (4, 3));
    }
}
