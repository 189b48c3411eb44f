//! Re-encoding of rendered rasters with caller-controlled settings.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use image::DynamicImage;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use log::debug;

use crate::error::{Error, Result};

/// PNG encoder settings derived from `optimize` and a 0-9 compression level.
///
/// Level 0 stores the image uncompressed; 1-9 map onto the same deflate
/// levels. `optimize` overrides the level with the strongest compression and
/// adaptive filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngEncoding {
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl PngEncoding {
    pub fn new(optimize: bool, compress_level: u8) -> Self {
        if optimize {
            return Self {
                compression: CompressionType::Best,
                filter: FilterType::Adaptive,
            };
        }
        let compression = match compress_level {
            0 => CompressionType::Uncompressed,
            level => CompressionType::Level(level.min(9)),
        };
        Self {
            compression,
            filter: FilterType::Sub,
        }
    }
}

/// Encode `img` as PNG into `output`.
pub fn write_png(img: &DynamicImage, output: &Path, encoding: PngEncoding) -> Result<()> {
    let writer = BufWriter::new(File::create(output)?);
    let encoder = PngEncoder::new_with_quality(writer, encoding.compression, encoding.filter);
    img.write_with_encoder(encoder)?;
    Ok(())
}

/// Encode `img` as WebP into `output`, lossy at `quality` (0-100) or lossless.
pub fn write_webp(img: &DynamicImage, output: &Path, quality: f32, lossless: bool) -> Result<()> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let encoder = webp::Encoder::from_image(&rgba).map_err(|e| Error::Encode(e.to_string()))?;
    let memory = if lossless {
        encoder.encode_lossless()
    } else {
        encoder.encode(quality.clamp(0.0, 100.0))
    };
    fs::write(output, &*memory)?;
    Ok(())
}

/// Decode the intermediate raster at `input` and write it to `output` as PNG.
pub fn reencode_png(input: &Path, output: &Path, encoding: PngEncoding) -> Result<()> {
    let img = image::open(input)?;
    debug!(
        "Re-encoding {}x{} PNG with {encoding:?}",
        img.width(),
        img.height()
    );
    write_png(&img, output, encoding)
}

/// Decode the intermediate raster at `input` and write it to `output` as WebP.
pub fn reencode_webp(input: &Path, output: &Path, quality: f32, lossless: bool) -> Result<()> {
    let img = image::open(input)?;
    debug!(
        "Re-encoding {}x{} WebP (quality {quality}, lossless {lossless})",
        img.width(),
        img.height()
    );
    write_webp(&img, output, quality, lossless)
}
