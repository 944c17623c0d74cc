// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: bounded decoding, alpha flattening, and PNG normalisation
// for page rasters and embedded pictures. Operates on in-memory images using
// the `image` crate.

use std::io::Cursor;

use image::{DynamicImage, ImageError, ImageFormat, ImageReader, Limits, Rgb, RgbImage, Rgba};
use trimpress_core::error::TrimpressError;
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns a new `ImageProcessor`, enabling
/// method chaining:
///
/// ```ignore
/// let png = ImageProcessor::from_bytes_bounded(&bytes, 40_000_000)?
///     .flatten_onto_white()
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode encoded bytes (PNG, JPEG, TIFF, ...), refusing images larger
    /// than `max_pixels`.
    ///
    /// Oversized images and allocation-limit failures surface as
    /// `ResourceExhausted`; anything else undecodable is an `ImageError`.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes_bounded(data: &[u8], max_pixels: u64) -> Result<Self, TrimpressError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| TrimpressError::ImageError(format!("unreadable image: {err}")))?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(map_decode_error)?;
        check_pixel_budget(width, height, max_pixels)?;

        let mut reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|err| TrimpressError::ImageError(format!("unreadable image: {err}")))?;
        let mut limits = Limits::default();
        // RGBA8 is the widest layout we ever hold; leave room for one copy.
        limits.max_alloc = Some(max_pixels.saturating_mul(8));
        reader.limits(limits);

        let img = reader.decode().map_err(map_decode_error)?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Transformations ------------------------------------------------------

    /// Composite any transparency onto a white background.
    ///
    /// PDF image XObjects are written as RGB; without this step transparent
    /// regions would print as black.
    pub fn flatten_onto_white(self) -> Self {
        if !self.image.color().has_alpha() {
            return self;
        }

        let rgba = self.image.to_rgba8();
        let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let alpha = a as u32;
            let blend = |channel: u8| -> u8 {
                ((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8
            };
            Rgb([blend(r), blend(g), blend(b)])
        });
        Self {
            image: DynamicImage::ImageRgb8(flattened),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, TrimpressError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Consume the processor, yielding tightly packed RGB8 pixels and the
    /// image dimensions.
    pub fn into_rgb8(self) -> (Vec<u8>, u32, u32) {
        let rgb = self.image.into_rgb8();
        let (width, height) = rgb.dimensions();
        (rgb.into_raw(), width, height)
    }
}

/// Re-encode any supported image as PNG, releasing the decoded pixels before
/// returning.
pub fn normalize_to_png(data: &[u8], max_pixels: u64) -> Result<Vec<u8>, TrimpressError> {
    ImageProcessor::from_bytes_bounded(data, max_pixels)?
        .flatten_onto_white()
        .to_png_bytes()
}

/// Read width and height from an image header without decoding pixels.
pub fn image_dimensions(data: &[u8]) -> Result<(u32, u32), TrimpressError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| TrimpressError::ImageError(format!("unreadable image: {err}")))?
        .into_dimensions()
        .map_err(map_decode_error)
}

fn check_pixel_budget(width: u32, height: u32, max_pixels: u64) -> Result<(), TrimpressError> {
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(TrimpressError::ResourceExhausted(format!(
            "{width}x{height} image ({pixels} px) exceeds the {max_pixels} px page budget"
        )));
    }
    Ok(())
}

fn map_decode_error(err: ImageError) -> TrimpressError {
    match err {
        ImageError::Limits(limit) => TrimpressError::ResourceExhausted(format!(
            "image decoder limit reached: {limit}"
        )),
        other => TrimpressError::ImageError(format!("failed to decode image: {other}")),
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, TrimpressError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| match err {
        ImageError::Limits(limit) => {
            TrimpressError::ResourceExhausted(format!("image encoder limit reached: {limit}"))
        }
        other => TrimpressError::ImageError(format!("image encoding failed: {other}")),
    })?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png_of(image: DynamicImage) -> Vec<u8> {
        encode_to_format(&image, ImageFormat::Png).unwrap()
    }

    #[test]
    fn transparent_pixels_become_white() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0]));
        let (pixels, width, height) = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(img))
            .flatten_onto_white()
            .into_rgb8();
        assert_eq!((width, height), (4, 4));
        assert_eq!(&pixels[..3], &[255, 255, 255]);
    }

    #[test]
    fn opaque_pixels_are_kept() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let (pixels, _, _) = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(img))
            .flatten_onto_white()
            .into_rgb8();
        assert_eq!(&pixels[9..12], &[10, 20, 30]);
    }

    #[test]
    fn oversized_image_is_resource_exhausted() {
        let png = png_of(DynamicImage::ImageRgb8(RgbImage::new(100, 100)));
        let err = ImageProcessor::from_bytes_bounded(&png, 5_000).err().unwrap();
        assert!(matches!(err, TrimpressError::ResourceExhausted(_)));
    }

    #[test]
    fn normalize_produces_decodable_png() {
        let img = RgbImage::from_pixel(30, 20, Rgb([200, 100, 50]));
        let out = normalize_to_png(&png_of(DynamicImage::ImageRgb8(img)), 1_000_000).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        assert_eq!(image_dimensions(&out).unwrap(), (30, 20));
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = normalize_to_png(b"not an image at all", 1_000).unwrap_err();
        assert!(matches!(err, TrimpressError::ImageError(_)));
    }
}
