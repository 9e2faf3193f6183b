// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Result export.
//!
//! This module handles the clipboard JSON text and the downloadable image
//! with the bounding box burned in.

use crate::error::AppError;
use crate::models::detection::DetectionResult;
use crate::render::composite::compose;
use crate::render::overlay::OverlayStyle;
use anyhow::Result;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Encodings offered by the save dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    /// Format implied by a path's extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => ExportFormat::Jpeg,
            _ => ExportFormat::Png,
        }
    }
}

/// Pretty-printed JSON of a result, as copied to the clipboard.
pub fn result_json(result: &DetectionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// `{brand}_detected.{ext}`, with path separators in the brand replaced.
pub fn export_file_name(result: &DetectionResult, format: ExportFormat) -> String {
    let brand: String = result
        .brand
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect();
    format!("{}_detected.{}", brand, format.extension())
}

/// Encode an RGBA image in the given format.
pub fn encode_image(image: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>, AppError> {
    let mut out = Cursor::new(Vec::new());
    let written = match format {
        ExportFormat::Png => image.write_to(&mut out, ImageFormat::Png),
        // JPEG has no alpha channel
        ExportFormat::Jpeg => image::DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .write_to(&mut out, ImageFormat::Jpeg),
    };
    written.map_err(|e| AppError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Encode `source` with the box burned in at full resolution.
pub fn render_export(
    source: &RgbaImage,
    result: &DetectionResult,
    format: ExportFormat,
) -> Result<Vec<u8>, AppError> {
    let composite = compose(source, result, &OverlayStyle::EXPORT);
    encode_image(&composite, format)
}

/// Write the burned-in export to `path`; the format follows the extension.
pub fn save_export(source: &RgbaImage, result: &DetectionResult, path: &Path) -> Result<()> {
    let bytes = render_export(source, result, ExportFormat::from_path(path))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::BoundingBox;

    fn result() -> DetectionResult {
        DetectionResult {
            brand: "Mercedes".into(),
            confidence: 0.93,
            latency: "0.31s".into(),
            bbox: BoundingBox::new(10.0, 30.0, 40.0, 20.0),
            model_info: Some(serde_json::json!({"version": "V5"})),
            error: None,
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            export_file_name(&result(), ExportFormat::Png),
            "Mercedes_detected.png"
        );
        let mut odd = result();
        odd.brand = "A/B".into();
        assert_eq!(export_file_name(&odd, ExportFormat::Jpeg), "A_B_detected.jpg");
    }

    #[test]
    fn test_result_json_is_pretty_and_complete() {
        let json = result_json(&result()).unwrap();
        assert!(json.contains('\n'));
        let parsed: DetectionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result());

        let failure = result_json(&DetectionResult::failure("offline")).unwrap();
        assert!(failure.contains("\"error\": \"offline\""));
        assert!(!failure.contains("model_info"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("x.JPEG")), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(Path::new("x.png")), ExportFormat::Png);
        assert_eq!(ExportFormat::from_path(Path::new("x")), ExportFormat::Png);
    }

    #[test]
    fn test_save_export_round_trips_size() {
        let dir = tempfile::tempdir().unwrap();
        let source = RgbaImage::from_pixel(120, 90, image::Rgba([20, 40, 60, 255]));

        for name in ["out.png", "out.jpg"] {
            let path = dir.path().join(name);
            save_export(&source, &result(), &path).unwrap();
            let reloaded = image::open(&path).unwrap();
            assert_eq!((reloaded.width(), reloaded.height()), (120, 90));
        }
    }
}
