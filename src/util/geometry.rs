// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between the source
//! image's natural pixel space and a differently sized drawing surface.

use crate::models::detection::BoundingBox;

/// Rectangle in drawing-surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Independent horizontal and vertical scale factors (`surface / natural`).
pub fn scale_factors(natural: (u32, u32), surface: (f32, f32)) -> (f32, f32) {
    let factor = |surface: f32, natural: u32| {
        if natural == 0 {
            0.0
        } else {
            surface / natural as f32
        }
    };
    (factor(surface.0, natural.0), factor(surface.1, natural.1))
}

/// Project a box from natural pixel space onto a surface of the given size.
pub fn scale_box(bbox: &BoundingBox, natural: (u32, u32), surface: (f32, f32)) -> Rect {
    let (sx, sy) = scale_factors(natural, surface);
    Rect {
        x: bbox.x as f32 * sx,
        y: bbox.y as f32 * sy,
        w: bbox.w as f32 * sx,
        h: bbox.h as f32 * sy,
    }
}

/// Largest size with the image's aspect ratio that fits in `available`.
pub fn fit_size(natural: (u32, u32), available: (f32, f32)) -> (f32, f32) {
    let (img_width, img_height) = natural;
    if img_width == 0 || img_height == 0 || available.0 <= 0.0 || available.1 <= 0.0 {
        return (0.0, 0.0);
    }
    let img_aspect = img_width as f32 / img_height as f32;
    let available_aspect = available.0 / available.1;

    if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available.0, available.0 / img_aspect)
    } else {
        // Image is taller - fit to height
        (available.1 * img_aspect, available.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_box_half_size() {
        let bbox = BoundingBox::new(100.0, 100.0, 200.0, 150.0);
        let rect = scale_box(&bbox, (1000, 800), (500.0, 400.0));
        assert_eq!(rect, Rect::new(50.0, 50.0, 100.0, 75.0));
    }

    #[test]
    fn test_scale_factors_are_independent() {
        let (sx, sy) = scale_factors((200, 100), (100.0, 100.0));
        assert_eq!(sx, 0.5);
        assert_eq!(sy, 1.0);
    }

    #[test]
    fn test_zero_natural_size() {
        let rect = scale_box(&BoundingBox::PLACEHOLDER, (0, 0), (640.0, 480.0));
        assert_eq!(rect, Rect::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_fit_size() {
        // Wider image, fit to width
        assert_eq!(fit_size((2000, 1000), (500.0, 500.0)), (500.0, 250.0));
        // Taller image, fit to height
        assert_eq!(fit_size((400, 800), (1000.0, 400.0)), (200.0, 400.0));
        assert_eq!(fit_size((0, 10), (100.0, 100.0)), (0.0, 0.0));
    }
}
