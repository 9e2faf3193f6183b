// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image intake.
//!
//! Turns files picked in a dialog, dropped on the window or named on the
//! command line into validated, decoded source images.

use crate::error::AppError;
use crate::models::source::{FileCandidate, SourceImage, Upload};
use std::path::Path;

const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Build a candidate from a file on disk.
pub fn candidate_from_path(path: &Path) -> Result<FileCandidate, AppError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = guess_media_type(Some(path), &bytes);
    Ok(FileCandidate {
        name,
        media_type,
        bytes,
    })
}

/// Build a candidate from a file dropped on the window.
pub fn candidate_from_drop(file: &egui::DroppedFile) -> Result<FileCandidate, AppError> {
    if let Some(bytes) = &file.bytes {
        let media_type = if file.mime.is_empty() {
            guess_media_type(Some(Path::new(&file.name)), bytes)
        } else {
            file.mime.clone()
        };
        return Ok(FileCandidate {
            name: file.name.clone(),
            media_type,
            bytes: bytes.to_vec(),
        });
    }
    match &file.path {
        Some(path) => candidate_from_path(path),
        None => Err(AppError::Decode {
            name: file.name.clone(),
            reason: "dropped file has neither a path nor contents".to_string(),
        }),
    }
}

/// Media type from the file extension, falling back to content sniffing.
pub fn guess_media_type(path: Option<&Path>, bytes: &[u8]) -> String {
    path.and_then(|p| image::ImageFormat::from_path(p).ok())
        .or_else(|| image::guess_format(bytes).ok())
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|| UNKNOWN_MEDIA_TYPE.to_string())
}

/// Reject anything that does not report an image media type.
pub fn validate(candidate: &FileCandidate) -> Result<(), AppError> {
    if candidate.media_type.starts_with("image/") {
        Ok(())
    } else {
        log::warn!(
            "Rejected {}: media type {}",
            candidate.name,
            candidate.media_type
        );
        Err(AppError::InvalidFileType {
            name: candidate.name.clone(),
            media_type: candidate.media_type.clone(),
        })
    }
}

/// Decode a validated candidate into RGBA pixels.
pub fn decode(candidate: FileCandidate) -> Result<SourceImage, AppError> {
    let decoded = image::load_from_memory(&candidate.bytes).map_err(|e| AppError::Decode {
        name: candidate.name.clone(),
        reason: e.to_string(),
    })?;
    let pixels = decoded.to_rgba8();
    log::info!(
        "Decoded {} ({}x{})",
        candidate.name,
        pixels.width(),
        pixels.height()
    );
    Ok(SourceImage {
        upload: Upload {
            file_name: candidate.name,
            media_type: candidate.media_type,
            bytes: candidate.bytes,
        },
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_media_type_from_extension_and_content() {
        assert_eq!(guess_media_type(Some(Path::new("car.JPG")), &[]), "image/jpeg");
        assert_eq!(guess_media_type(None, &png_bytes(2, 2)), "image/png");
        assert_eq!(
            guess_media_type(Some(Path::new("notes.txt")), b"plain text"),
            UNKNOWN_MEDIA_TYPE
        );
    }

    #[test]
    fn test_validate_media_type() {
        let mut candidate = FileCandidate {
            name: "car.webp".into(),
            media_type: "image/webp".into(),
            bytes: Vec::new(),
        };
        assert!(validate(&candidate).is_ok());

        candidate.media_type = "application/pdf".into();
        assert!(matches!(
            validate(&candidate),
            Err(AppError::InvalidFileType { .. })
        ));
    }

    #[test]
    fn test_decode_success_and_failure() {
        let good = FileCandidate {
            name: "car.png".into(),
            media_type: "image/png".into(),
            bytes: png_bytes(8, 6),
        };
        let source = decode(good).unwrap();
        assert_eq!(source.natural_size(), (8, 6));
        assert_eq!(source.upload.media_type, "image/png");

        let corrupt = FileCandidate {
            name: "broken.png".into(),
            media_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G', 0, 0],
        };
        assert!(matches!(decode(corrupt), Err(AppError::Decode { .. })));
    }

    #[test]
    fn test_candidate_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png_bytes(3, 3)).unwrap();

        let candidate = candidate_from_path(&path).unwrap();
        assert_eq!(candidate.name, "photo.png");
        assert_eq!(candidate.media_type, "image/png");
    }
}
