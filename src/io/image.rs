//! Conversion between image files and real-valued pixel buffers

use crate::io::error::{Result, SynthesisError, invalid_parameter};
use crate::synthesis::PixelBuffer;
use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use ndarray::Array3;
use std::path::Path;

/// Channel layout a decoded sample is converted into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ChannelMode {
    /// Single luminance channel
    Gray,
    /// Red, green and blue
    #[default]
    Rgb,
    /// Red, green, blue and alpha
    Rgba,
}

impl ChannelMode {
    /// Number of channels produced by this mode
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Convert a decoded image into a pixel buffer with values in [0, 1]
pub fn image_to_pixel_buffer(img: &DynamicImage, mode: ChannelMode) -> PixelBuffer {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let (raw, channels) = match mode {
        ChannelMode::Gray => (img.to_luma8().into_raw(), 1),
        ChannelMode::Rgb => (img.to_rgb8().into_raw(), 3),
        ChannelMode::Rgba => (img.to_rgba8().into_raw(), 4),
    };

    // Raw buffers are row-major with interleaved channels, matching (row, col, channel)
    Array3::from_shape_fn((height, width, channels), |(r, c, ch)| {
        raw.get((r * width + c) * channels + ch)
            .map_or(0.0, |&v| f64::from(v) / 255.0)
    })
}

/// Load a sample image from disk
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_sample<P: AsRef<Path>>(path: P, mode: ChannelMode) -> Result<PixelBuffer> {
    let path_buf = path.as_ref().to_path_buf();
    let img = image::open(&path_buf).map_err(|e| SynthesisError::ImageLoad {
        path: path_buf,
        source: e,
    })?;
    Ok(image_to_pixel_buffer(&img, mode))
}

/// Scale a `[0, 1]` channel value to a byte, clamping out-of-range values
pub fn unit_to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert a pixel buffer into an image, choosing the color type by channel count
///
/// One channel becomes grayscale, two gray with alpha, three RGB and four RGBA.
/// Values are clamped to [0, 1] before scaling to bytes.
///
/// # Errors
///
/// Returns an error if the channel count has no matching color type or the
/// dimensions do not fit an image
pub fn pixel_buffer_to_image(buffer: &PixelBuffer) -> Result<DynamicImage> {
    let (rows, cols, channels) = buffer.dim();
    let width = u32::try_from(cols).map_err(|e| invalid_parameter("width", &cols, &e))?;
    let height = u32::try_from(rows).map_err(|e| invalid_parameter("height", &rows, &e))?;
    let raw: Vec<u8> = buffer.iter().copied().map(unit_to_byte).collect();

    let image = match channels {
        1 => GrayImage::from_raw(width, height, raw).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(width, height, raw).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(width, height, raw).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, raw).map(DynamicImage::ImageRgba8),
        _ => {
            return Err(invalid_parameter(
                "channels",
                &channels,
                &"only 1 to 4 channels can be written as an image",
            ));
        }
    };

    image.ok_or_else(|| {
        invalid_parameter(
            "buffer",
            &format!("{rows}x{cols}x{channels}"),
            &"pixel data does not cover the image dimensions",
        )
    })
}

/// Write a pixel buffer to disk, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if:
/// - The channel count has no matching color type
/// - The parent directory cannot be created
/// - The image cannot be encoded or saved
pub fn export_pixel_buffer<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let image = pixel_buffer_to_image(buffer)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SynthesisError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image.save(path).map_err(|e| SynthesisError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}
