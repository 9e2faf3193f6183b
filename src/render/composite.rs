// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Raster backend for overlay instructions.
//!
//! Burns the bounding box and label into a full-resolution copy of the
//! source image. Used by the viewer and by file export.

use super::overlay::{overlay_instructions, DrawOp, Geometry, OverlayStyle, Rgba};
use crate::models::detection::DetectionResult;
use crate::util::geometry::Rect;
use ab_glyph::{FontArc, PxScale};
use image::{Pixel, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use std::sync::OnceLock;

/// Proportional font shipped with egui, loaded once.
fn label_font() -> Option<&'static FontArc> {
    static FONT: OnceLock<Option<FontArc>> = OnceLock::new();
    FONT.get_or_init(|| {
        let definitions = egui::FontDefinitions::default();
        let data = definitions.font_data.get("Ubuntu-Light")?;
        match FontArc::try_from_vec(data.font.to_vec()) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("Label font unavailable, text will be skipped: {}", e);
                None
            }
        }
    })
    .as_ref()
}

fn pixel(color: Rgba) -> image::Rgba<u8> {
    image::Rgba(color.0)
}

fn pixel_rect(x: f32, y: f32, w: f32, h: f32) -> Option<imageproc::rect::Rect> {
    let (w, h) = (w.round(), h.round());
    if w < 1.0 || h < 1.0 {
        return None;
    }
    Some(imageproc::rect::Rect::at(x.round() as i32, y.round() as i32).of_size(w as u32, h as u32))
}

/// Outline centred on the rectangle edge, `width` pixels thick.
fn stroke_rect(canvas: &mut RgbaImage, rect: &Rect, width: f32, color: Rgba) {
    let passes = width.round().max(1.0) as i32;
    let half = passes / 2;
    for i in 0..passes {
        let offset = (i - half) as f32;
        if let Some(ring) = pixel_rect(
            rect.x + offset,
            rect.y + offset,
            rect.w - 2.0 * offset,
            rect.h - 2.0 * offset,
        ) {
            draw_hollow_rect_mut(canvas, ring, pixel(color));
        }
    }
}

/// Replay `ops` onto `canvas`.
pub fn rasterize(canvas: &mut RgbaImage, ops: &[DrawOp]) {
    for op in ops {
        match op {
            DrawOp::Clear => {
                for p in canvas.pixels_mut() {
                    *p = image::Rgba([0, 0, 0, 0]);
                }
            }
            DrawOp::StrokeRect { rect, width, color } => stroke_rect(canvas, rect, *width, *color),
            DrawOp::FillRect { rect, color } => {
                if let Some(r) = pixel_rect(rect.x, rect.y, rect.w, rect.h) {
                    draw_filled_rect_mut(canvas, r, pixel(*color));
                }
            }
            DrawOp::Text {
                x,
                y,
                size,
                text,
                color,
            } => {
                if let Some(font) = label_font() {
                    draw_text_mut(
                        canvas,
                        pixel(*color),
                        x.round() as i32,
                        y.round() as i32,
                        PxScale::from(*size),
                        font,
                        text,
                    );
                }
            }
        }
    }
}

/// Copy of `source` with the result's box and label burned in.
pub fn compose(source: &RgbaImage, result: &DetectionResult, style: &OverlayStyle) -> RgbaImage {
    let (width, height) = source.dimensions();
    let ops = overlay_instructions(result, &Geometry::natural((width, height)), style);

    let mut layer = RgbaImage::new(width, height);
    rasterize(&mut layer, &ops);

    let mut composite = source.clone();
    for (dst, src) in composite.pixels_mut().zip(layer.pixels()) {
        match src.0[3] {
            0 => {}
            255 => *dst = *src,
            _ => dst.blend(src),
        }
    }
    composite
}
