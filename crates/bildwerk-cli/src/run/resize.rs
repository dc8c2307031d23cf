// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// resize-images — scale every image below a folder to one width and store it
// as JPEG in place of the original.

use std::io::Write;
use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{BatchConfig, OutputTarget};
use bildwerk_document::ImageAsset;
use bildwerk_document::image::asset::encode_jpeg;
use bildwerk_document::locate::scan_tree;
use tracing::instrument;

use crate::emit::write_target;
use crate::report::{Reporter, RunSummary};

/// Accept only widths that fit a positive `u32`.
pub fn validate_width(width: i64) -> Result<u32> {
    u32::try_from(width)
        .ok()
        .filter(|w| *w > 0)
        .ok_or(BildwerkError::InvalidWidth(width))
}

struct Resized {
    from: (u32, u32),
    to: (u32, u32),
}

/// Resize every image anywhere below `folder` to `width` pixels wide,
/// keeping the aspect ratio.
#[instrument(skip_all, fields(folder = %folder.display(), width = width))]
pub fn resize_tree<W: Write>(folder: &Path, width: i64, config: &BatchConfig, out: W) -> Result<RunSummary> {
    let target_width = validate_width(width)?;
    let images = scan_tree(folder)?;
    let mut reporter = Reporter::new(out);

    if images.is_empty() {
        reporter.note(format_args!("No images found in folder: {}", folder.display()))?;
        return Ok(reporter.finish(None));
    }

    reporter.found(images.len(), "folder (including subfolders)")?;
    reporter.note(format_args!("Target width: {target_width}px"))?;
    reporter.blank()?;

    for path in &images {
        let relative = path.strip_prefix(folder).unwrap_or(path).display().to_string();
        match resize_one(path, target_width, config.jpeg_quality) {
            Ok(Resized { from, to }) => reporter.success(format_args!(
                "Resized: {} ({}x{} -> {}x{})",
                relative, from.0, from.1, to.0, to.1
            ))?,
            Err(err) => reporter.failure("process", &relative, &err)?,
        }
    }

    reporter.blank()?;
    let processed = reporter.counters().succeeded;
    reporter.summary(format_args!("Done! Processed {processed} images."))?;
    Ok(reporter.finish(None))
}

fn resize_one(path: &Path, target_width: u32, quality: u8) -> Result<Resized> {
    let asset = ImageAsset::open(path)?;
    let from = (asset.width(), asset.height());

    let resized = asset.resize_to_width(target_width);
    let to = (resized.width(), resized.height());

    let jpeg = encode_jpeg(&resized.into_rgb(), quality)?;
    write_target(&OutputTarget::replace(path), &jpeg)?;
    Ok(Resized { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::fs;

    fn run(folder: &Path, width: i64) -> (Result<RunSummary>, String) {
        let mut buffer = Vec::new();
        let result = resize_tree(folder, width, &BatchConfig::default(), &mut buffer);
        (result, String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn width_must_be_positive() {
        assert_eq!(validate_width(50).unwrap(), 50);
        assert!(matches!(validate_width(0), Err(BildwerkError::InvalidWidth(0))));
        assert!(matches!(validate_width(-3), Err(BildwerkError::InvalidWidth(-3))));
        assert!(validate_width(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn invalid_width_checked_before_folder() {
        let (result, output) = run(Path::new("/definitely/not/here"), 0);
        assert!(matches!(result, Err(BildwerkError::InvalidWidth(0))));
        assert!(output.is_empty());
    }

    #[test]
    fn downscales_and_replaces_original() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("wide.png");
        RgbImage::from_pixel(200, 100, Rgb([10, 120, 230]))
            .save(&source)
            .unwrap();

        let (result, output) = run(dir.path(), 50);
        let summary = result.unwrap();

        assert_eq!(summary.counters.succeeded, 1);
        assert!(!source.exists());
        let resized = image::open(dir.path().join("wide.jpg")).unwrap();
        assert_eq!((resized.width(), resized.height()), (50, 25));
        assert!(output.contains("Target width: 50px\n"));
        assert!(output.contains("  Resized: wide.png (200x100 -> 50x25)\n"));
        assert!(output.ends_with("\nDone! Processed 1 images.\n"));
    }

    #[test]
    fn walks_subfolders_and_upscales() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        RgbaImage::from_pixel(10, 7, Rgba([1, 2, 3, 4]))
            .save(dir.path().join("sub/small.png"))
            .unwrap();
        let jpeg = dir.path().join("top.jpg");
        RgbImage::from_pixel(30, 30, Rgb([50, 50, 50])).save(&jpeg).unwrap();

        let (result, output) = run(dir.path(), 40);
        assert_eq!(result.unwrap().counters.succeeded, 2);

        let small = image::open(dir.path().join("sub/small.jpg")).unwrap();
        assert_eq!((small.width(), small.height()), (40, 28));
        let top = image::open(&jpeg).unwrap();
        assert_eq!((top.width(), top.height()), (40, 40));

        let sub_line = output.find("Resized: sub").unwrap();
        let top_line = output.find("Resized: top.jpg").unwrap();
        assert!(sub_line < top_line);
        assert!(output.starts_with("Found 2 images in folder (including subfolders)...\n"));
    }

    #[test]
    fn undecodable_file_reported_with_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("deep")).unwrap();
        fs::write(dir.path().join("deep/broken.webp"), b"RIFF....").unwrap();

        let (result, output) = run(dir.path(), 10);
        let summary = result.unwrap();
        assert_eq!(summary.counters.failed, 1);
        assert!(dir.path().join("deep/broken.webp").exists());
        let relative = Path::new("deep").join("broken.webp");
        assert!(output.contains(&format!("  Warning: Failed to process {}: ", relative.display())));
        assert!(output.contains("Done! Processed 0 images. (1 failed)"));
    }
}
