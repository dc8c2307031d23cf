// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image normaliser — decode, detect colour mode, resize to a target width and
// produce RGB JPEG output. Operates on in-memory images using the `image` crate.

use std::io::Cursor;
use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use image::imageops::FilterType;
use image::{
    ColorType, DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat, ImageReader, RgbImage,
};
use tracing::{debug, instrument};

/// Colour layout of a decoded image, as far as JPEG output is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Three 8-bit channels, nothing to convert.
    Rgb,
    /// Palette-based source (PNG `PLTE`, …).
    Indexed,
    /// Carries an alpha channel.
    Alpha,
    /// Grayscale, 16-bit, float, CMYK-converted, …
    Other,
}

impl ColorMode {
    fn detect(original: ExtendedColorType, decoded: ColorType) -> Self {
        // Decoders report palette images as an unknown layout of N bits.
        if matches!(original, ExtendedColorType::Unknown(_)) {
            return ColorMode::Indexed;
        }
        Self::of(decoded)
    }

    fn of(decoded: ColorType) -> Self {
        if decoded.has_alpha() {
            ColorMode::Alpha
        } else if decoded == ColorType::Rgb8 {
            ColorMode::Rgb
        } else {
            ColorMode::Other
        }
    }

    /// Palette and alpha images must be flattened before JPEG encoding; the
    /// original bytes can never be reused for them.
    pub fn needs_flattening(self) -> bool {
        matches!(self, ColorMode::Indexed | ColorMode::Alpha)
    }
}

/// A decoded image plus what is known about its source encoding.
///
/// Transformations consume `self` and return the new asset, mirroring the
/// single-owner lifecycle of a work item: decoded, normalised, written, dropped.
pub struct ImageAsset {
    image: DynamicImage,
    mode: ColorMode,
    format: Option<ImageFormat>,
    /// Source bytes, kept only while they still describe `image` exactly.
    encoded: Option<Vec<u8>>,
}

impl ImageAsset {
    // -- Construction ---------------------------------------------------------

    /// Read and decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes)
    }

    /// Decode encoded bytes (JPEG, PNG, GIF, WebP, BMP, TIFF).
    #[instrument(skip_all, fields(data_len = bytes.len()))]
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (image, original, format) = {
            let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
                .with_guessed_format()
                .map_err(|err| BildwerkError::ImageError(format!("cannot read image: {}", err)))?;
            let format = reader.format();
            let decoder = reader.into_decoder().map_err(|err| {
                BildwerkError::ImageError(format!("cannot identify image: {}", err))
            })?;
            let original = decoder.original_color_type();
            let image = DynamicImage::from_decoder(decoder).map_err(|err| {
                BildwerkError::ImageError(format!("failed to decode image: {}", err))
            })?;
            (image, original, format)
        };

        let mode = ColorMode::detect(original, image.color());
        debug!(
            width = image.width(),
            height = image.height(),
            ?format,
            ?mode,
            "Image decoded"
        );

        Ok(Self {
            image,
            mode,
            format,
            encoded: Some(bytes),
        })
    }

    /// Wrap pixels that were never encoded (raw PDF image streams).
    pub fn from_pixels(image: DynamicImage) -> Self {
        let mode = ColorMode::of(image.color());
        Self {
            image,
            mode,
            format: None,
            encoded: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Encoding the asset was decoded from, if any.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Whether [`ImageAsset::into_jpeg`] will hand back the source bytes
    /// untouched.
    pub fn is_passthrough_jpeg(&self) -> bool {
        self.format == Some(ImageFormat::Jpeg)
            && !self.mode.needs_flattening()
            && self.encoded.is_some()
    }

    // -- Transformations ------------------------------------------------------

    /// Scale to exactly `target_width`, keeping the aspect ratio. Always
    /// resamples, whether the image grows or shrinks.
    #[instrument(skip(self))]
    pub fn resize_to_width(self, target_width: u32) -> Self {
        let target_height = scaled_height(self.width(), self.height(), target_width);
        debug!(
            from_w = self.width(),
            from_h = self.height(),
            target_width,
            target_height,
            "Resizing image"
        );
        let resized = self
            .image
            .resize_exact(target_width, target_height, FilterType::Lanczos3);
        Self {
            image: resized,
            mode: self.mode,
            format: self.format,
            encoded: None,
        }
    }

    /// Flatten to 8-bit RGB. Alpha is dropped and palettes expanded, which is
    /// the image library's default conversion.
    pub fn into_rgb(self) -> RgbImage {
        self.image.into_rgb8()
    }

    // -- Output ---------------------------------------------------------------

    /// JPEG bytes for this asset. Already-JPEG sources that need no
    /// flattening come back byte-for-byte; everything else is converted to
    /// RGB and encoded.
    pub fn into_jpeg(self, quality: u8) -> Result<Vec<u8>> {
        let passthrough = self.is_passthrough_jpeg();
        let Self { image, encoded, .. } = self;
        match encoded {
            Some(bytes) if passthrough => {
                debug!(bytes = bytes.len(), "Reusing original JPEG bytes");
                Ok(bytes)
            }
            _ => encode_jpeg(&image.into_rgb8(), quality),
        }
    }
}

/// Height that keeps the aspect ratio at `target_width`:
/// `round(height * target_width / width)`, never below one pixel.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return height.max(1);
    }
    let scaled = (f64::from(height) * f64::from(target_width) / f64::from(width)).round();
    (scaled as u32).max(1)
}

/// Encode RGB pixels as JPEG.
pub fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| BildwerkError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbaImage};

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), format)
            .unwrap();
        buffer
    }

    fn rgb_jpeg(width: u32, height: u32) -> Vec<u8> {
        let rgb = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        encode_jpeg(&rgb, 90).unwrap()
    }

    #[test]
    fn rgba_png_is_flattened() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, image::Rgba([0, 128, 255, 100])));
        let asset = ImageAsset::from_bytes(encode(&rgba, ImageFormat::Png)).unwrap();

        assert_eq!(asset.format(), Some(ImageFormat::Png));
        assert_eq!(asset.mode(), ColorMode::Alpha);
        assert!(!asset.is_passthrough_jpeg());

        let jpeg = asset.into_jpeg(85).unwrap();
        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
    }

    #[test]
    fn rgb_jpeg_passes_through_unchanged() {
        let bytes = rgb_jpeg(40, 30);
        let asset = ImageAsset::from_bytes(bytes.clone()).unwrap();

        assert_eq!(asset.format(), Some(ImageFormat::Jpeg));
        assert_eq!(asset.mode(), ColorMode::Rgb);
        assert!(asset.is_passthrough_jpeg());
        assert_eq!(asset.into_jpeg(85).unwrap(), bytes);
    }

    #[test]
    fn grayscale_jpeg_also_passes_through() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([90])));
        let bytes = encode(&gray, ImageFormat::Jpeg);
        let asset = ImageAsset::from_bytes(bytes.clone()).unwrap();

        assert_eq!(asset.mode(), ColorMode::Other);
        assert_eq!(asset.into_jpeg(85).unwrap(), bytes);
    }

    #[test]
    fn grayscale_png_becomes_rgb_jpeg() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 4, Luma([30])));
        let asset = ImageAsset::from_bytes(encode(&gray, ImageFormat::Png)).unwrap();
        assert_eq!(asset.mode(), ColorMode::Other);

        let jpeg = asset.into_jpeg(85).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
    }

    #[test]
    fn gif_needs_flattening() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, image::Rgba([10, 20, 30, 255])));
        let asset = ImageAsset::from_bytes(encode(&rgba, ImageFormat::Gif)).unwrap();
        assert!(asset.mode().needs_flattening());
        assert!(!asset.is_passthrough_jpeg());
    }

    #[test]
    fn resized_jpeg_is_reencoded() {
        let bytes = rgb_jpeg(200, 100);
        let asset = ImageAsset::from_bytes(bytes.clone()).unwrap().resize_to_width(50);

        assert_eq!((asset.width(), asset.height()), (50, 25));
        assert!(!asset.is_passthrough_jpeg());
        assert_ne!(asset.into_jpeg(85).unwrap(), bytes);
    }

    #[test]
    fn resize_always_applies() {
        let small = ImageAsset::from_pixels(DynamicImage::ImageRgb8(RgbImage::new(10, 10)));
        let grown = small.resize_to_width(40);
        assert_eq!((grown.width(), grown.height()), (40, 40));
    }

    #[test]
    fn scaled_height_rounds() {
        assert_eq!(scaled_height(200, 100, 50), 25);
        assert_eq!(scaled_height(3, 2, 2), 1);
        assert_eq!(scaled_height(3, 2, 4), 3);
        assert_eq!(scaled_height(640, 480, 100), 75);
        assert_eq!(scaled_height(7, 5, 3), 2);
        assert_eq!(scaled_height(1000, 1, 1), 1);
    }

    #[test]
    fn pixels_have_no_source_format() {
        let asset = ImageAsset::from_pixels(DynamicImage::ImageRgb8(RgbImage::new(4, 4)));
        assert_eq!(asset.format(), None);
        assert_eq!(asset.mode(), ColorMode::Rgb);
        assert!(!asset.is_passthrough_jpeg());
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        let err = ImageAsset::from_bytes(b"definitely not an image".to_vec())
            .err()
            .unwrap();
        assert!(matches!(err, BildwerkError::ImageError(_)));
    }
}
