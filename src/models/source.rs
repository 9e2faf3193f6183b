// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Source image records.

use image::RgbaImage;

/// A user-supplied file that has not been validated yet.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Raw file payload sent to the detection service.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// A decoded image ready to be shown and analyzed.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub upload: Upload,
    pub pixels: RgbaImage,
}

impl SourceImage {
    /// Natural (pixel) size of the image.
    pub fn natural_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn name(&self) -> &str {
        &self.upload.file_name
    }
}

/// Identifies the display resource created for one loaded image.
///
/// A new handle is allocated every time an image is accepted; the previous
/// one is released at the same moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayHandle(pub u64);
