//! Frame capture and GIF generation for synthesis passes

use crate::io::error::{Result, SynthesisError};
use crate::io::image::unit_to_byte;
use crate::synthesis::{PassObserver, PassReport, PixelBuffer};
use image::{Delay, Frame, Rgba, RgbaImage};
use ndarray::Array2;
use std::path::Path;

/// Snapshot of the output after one pass
#[derive(Debug, Clone)]
pub struct PassFrame {
    /// Pass the snapshot was taken after
    pub pass: usize,
    /// RGBA rendering of the output at that point
    pub image: RgbaImage,
}

/// Records one frame per synthesis pass for animated playback
///
/// Pixels still unfilled after a pass are rendered fully transparent.
#[derive(Debug, Default)]
pub struct PassRecorder {
    frames: Vec<PassFrame>,
}

/// Render a pixel buffer as RGBA, hiding pixels outside the mask
///
/// One channel is shown as gray, two as gray with alpha, three as RGB, and
/// four or more use the first four channels as RGBA.
pub fn render_rgba(output: &PixelBuffer, filled: Option<&Array2<bool>>) -> RgbaImage {
    let (rows, cols, channels) = output.dim();
    let mut img = RgbaImage::new(cols as u32, rows as u32);

    for r in 0..rows {
        for c in 0..cols {
            let known = filled.is_none_or(|mask| mask.get([r, c]).copied().unwrap_or(false));
            let value = |ch: usize| unit_to_byte(output.get([r, c, ch]).copied().unwrap_or(0.0));
            let color = if !known {
                [0, 0, 0, 0]
            } else {
                match channels {
                    0 => [0, 0, 0, 0],
                    1 => [value(0), value(0), value(0), 255],
                    2 => [value(0), value(0), value(0), value(1)],
                    3 => [value(0), value(1), value(2), 255],
                    _ => [value(0), value(1), value(2), value(3)],
                }
            };
            img.put_pixel(c as u32, r as u32, Rgba(color));
        }
    }

    img
}

impl PassRecorder {
    /// Create an empty recorder
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Recorded frames in pass order
    pub fn frames(&self) -> &[PassFrame] {
        &self.frames
    }

    /// Returns the total number of recorded frames
    pub const fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Record the output as it stands after a pass
    pub fn record(&mut self, report: &PassReport, output: &PixelBuffer, filled: &Array2<bool>) {
        self.frames.push(PassFrame {
            pass: report.pass,
            image: render_rgba(output, Some(filled)),
        });
    }

    /// Export the captured frames as a GIF with automatic frame skipping
    ///
    /// Frames are dropped evenly when the requested delay is shorter than
    /// viewers honor, so the apparent speed is kept. The last frame is always
    /// kept and held longer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No frames were captured
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif<P: AsRef<Path>>(&self, output_path: P, frame_delay_ms: u32) -> Result<()> {
        use crate::io::configuration::VIEWER_MIN_FRAME_DELAY_MS;

        let output_path = output_path.as_ref();
        let Some(last) = self.frames.last() else {
            return Err(crate::io::error::invalid_parameter(
                "visualization",
                &"empty",
                &"no synthesis passes were captured",
            ));
        };

        let frame_delay_ms = frame_delay_ms.max(1);
        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms) as usize
        } else {
            1
        };

        let mut frames: Vec<Frame> = self
            .frames
            .iter()
            .step_by(skip_factor)
            .map(|frame| {
                Frame::from_parts(
                    frame.image.clone(),
                    0,
                    0,
                    Delay::from_numer_denom_ms(effective_delay_ms, 1),
                )
            })
            .collect();

        // Final frame displays longer for better visibility
        frames.push(Frame::from_parts(
            last.image.clone(),
            0,
            0,
            Delay::from_numer_denom_ms(effective_delay_ms * 25, 1),
        ));

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SynthesisError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| SynthesisError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| SynthesisError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }
}

impl PassObserver for PassRecorder {
    fn on_pass(&mut self, report: &PassReport, output: &PixelBuffer, filled: &Array2<bool>) {
        self.record(report, output, filled);
    }
}
