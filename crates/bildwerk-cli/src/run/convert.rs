// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// convert-to-jpg — replace every non-JPEG image in a folder by a JPEG.

use std::io::Write;
use std::path::Path;

use bildwerk_core::error::Result;
use bildwerk_core::{BatchConfig, OutputTarget, has_jpeg_extension};
use bildwerk_document::ImageAsset;
use bildwerk_document::image::asset::encode_jpeg;
use bildwerk_document::locate::scan_folder;
use tracing::instrument;

use super::display_name;
use crate::emit::write_target;
use crate::report::{Reporter, RunSummary};

/// Convert the images directly inside `folder`.
///
/// Files already named `.jpg`/`.jpeg` are left alone and counted as done.
#[instrument(skip_all, fields(folder = %folder.display()))]
pub fn convert_folder<W: Write>(folder: &Path, config: &BatchConfig, out: W) -> Result<RunSummary> {
    let images = scan_folder(folder)?;
    let mut reporter = Reporter::new(out);

    if images.is_empty() {
        reporter.note(format_args!("No images found in folder: {}", folder.display()))?;
        return Ok(reporter.finish(None));
    }

    reporter.found(images.len(), "folder")?;

    for path in &images {
        if has_jpeg_extension(path) {
            reporter.unchanged();
            continue;
        }

        let target = OutputTarget::replace(path);
        match convert_one(path, &target, config.jpeg_quality) {
            Ok(()) => reporter.success(format_args!(
                "Converted: {} -> {}",
                display_name(path),
                display_name(&target.path())
            ))?,
            Err(err) => reporter.failure("convert", &display_name(path), &err)?,
        }
    }

    reporter.blank()?;
    let converted = reporter.counters().succeeded;
    reporter.summary(format_args!("Done! Converted {converted} images."))?;
    Ok(reporter.finish(None))
}

fn convert_one(path: &Path, target: &OutputTarget, quality: u8) -> Result<()> {
    let rgb = ImageAsset::open(path)?.into_rgb();
    let jpeg = encode_jpeg(&rgb, quality)?;
    write_target(target, &jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bildwerk_core::BildwerkError;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::fs;

    fn run(folder: &Path) -> (Result<RunSummary>, String) {
        let mut buffer = Vec::new();
        let result = convert_folder(folder, &BatchConfig::default(), &mut buffer);
        (result, String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn png_replaced_and_jpeg_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(100, 50, Rgba([255, 0, 0, 128]))
            .save(dir.path().join("a.png"))
            .unwrap();
        let jpeg_path = dir.path().join("b.jpg");
        RgbImage::from_pixel(20, 20, Rgb([0, 0, 255]))
            .save_with_format(&jpeg_path, ImageFormat::Jpeg)
            .unwrap();
        let jpeg_before = fs::read(&jpeg_path).unwrap();

        let (result, output) = run(dir.path());
        let summary = result.unwrap();

        assert_eq!(summary.counters.succeeded, 2);
        assert_eq!(summary.counters.failed, 0);
        assert!(!dir.path().join("a.png").exists());
        let converted = image::open(dir.path().join("a.jpg")).unwrap();
        assert_eq!((converted.width(), converted.height()), (100, 50));
        assert_eq!(converted.color(), image::ColorType::Rgb8);
        assert_eq!(fs::read(&jpeg_path).unwrap(), jpeg_before);

        assert!(output.starts_with("Found 2 images in folder...\n"));
        assert!(output.contains("  Converted: a.png -> a.jpg\n"));
        assert!(output.ends_with("\nDone! Converted 2 images.\n"));
    }

    #[test]
    fn second_run_rewrites_nothing() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(8, 8, Rgb([9, 9, 9]))
            .save(dir.path().join("x.bmp"))
            .unwrap();
        run(dir.path()).0.unwrap();

        let path = dir.path().join("x.jpg");
        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        let bytes = fs::read(&path).unwrap();

        let (result, output) = run(dir.path());
        assert_eq!(result.unwrap().counters.succeeded, 1);
        assert!(!output.contains("Converted:"));
        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn broken_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.png"), b"not a png").unwrap();
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))
            .save(dir.path().join("good.bmp"))
            .unwrap();

        let (result, output) = run(dir.path());
        let summary = result.unwrap();
        assert_eq!(summary.counters.succeeded, 1);
        assert_eq!(summary.counters.failed, 1);
        assert!(dir.path().join("bad.png").exists());
        assert!(dir.path().join("good.jpg").exists());
        assert!(output.contains("  Warning: Failed to convert bad.png: "));
        assert!(output.contains("Done! Converted 1 images. (1 failed)"));
    }

    #[test]
    fn empty_folder_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let (result, output) = run(dir.path());
        assert_eq!(result.unwrap().counters.found, 0);
        assert!(output.starts_with("No images found in folder: "));
    }

    #[test]
    fn missing_folder_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (result, output) = run(&dir.path().join("missing"));
        assert!(matches!(result, Err(BildwerkError::FolderNotFound(_))));
        assert!(output.is_empty());
    }
}
