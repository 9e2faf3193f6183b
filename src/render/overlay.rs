// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding-box overlay as a list of draw instructions.
//!
//! [`overlay_instructions`] is pure: it turns a result plus the surface
//! geometry into [`DrawOp`]s that any backend (egui painter, raster image,
//! tests) can replay. Order is always: clear, box stroke, label
//! background, label text.

use crate::models::detection::DetectionResult;
use crate::util::geometry::{scale_box, Rect};

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BOX: Rgba = Rgba([0xff, 0x4f, 0xd8, 0xff]);
    pub const TEXT: Rgba = Rgba([0, 0, 0, 0xff]);

    pub const fn label(alpha: u8) -> Rgba {
        Rgba([0xff, 0x4f, 0xd8, alpha])
    }
}

/// One drawing step in surface coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Wipe the whole surface to transparent.
    Clear,
    StrokeRect {
        rect: Rect,
        width: f32,
        color: Rgba,
    },
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    /// Text whose top-left corner sits at `(x, y)`.
    Text {
        x: f32,
        y: f32,
        size: f32,
        text: String,
        color: Rgba,
    },
}

/// Size of the drawing surface and of the image it overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub surface: (f32, f32),
    pub natural: (u32, u32),
}

impl Geometry {
    /// Surface that matches the image pixel for pixel.
    pub fn natural(natural: (u32, u32)) -> Self {
        Self {
            surface: (natural.0 as f32, natural.1 as f32),
            natural,
        }
    }
}

/// Line and label metrics for one kind of surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub stroke_width: f32,
    pub label_height: f32,
    pub label_min_width: f32,
    pub label_alpha: u8,
    pub brand_size: f32,
    /// Second label line with the confidence, when set.
    pub confidence_size: Option<f32>,
    pub text_inset: f32,
}

impl OverlayStyle {
    /// Live overlay on the responsive preview.
    pub const INLINE: OverlayStyle = OverlayStyle {
        stroke_width: 3.0,
        label_height: 30.0,
        label_min_width: 0.0,
        label_alpha: 204,
        brand_size: 16.0,
        confidence_size: None,
        text_inset: 10.0,
    };

    /// Burned into the saved file at natural resolution.
    pub const EXPORT: OverlayStyle = OverlayStyle {
        stroke_width: 6.0,
        label_height: 60.0,
        label_min_width: 0.0,
        label_alpha: 204,
        brand_size: 32.0,
        confidence_size: None,
        text_inset: 20.0,
    };

    /// Viewer composite at natural resolution.
    pub const VIEWER: OverlayStyle = OverlayStyle {
        stroke_width: 8.0,
        label_height: 80.0,
        label_min_width: 300.0,
        label_alpha: 230,
        brand_size: 48.0,
        confidence_size: Some(32.0),
        text_inset: 20.0,
    };

    /// Reference long edge the fixed metrics above are tuned for.
    const REFERENCE_EDGE: f32 = 1280.0;

    /// Multiply every metric by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            stroke_width: self.stroke_width * factor,
            label_height: self.label_height * factor,
            label_min_width: self.label_min_width * factor,
            brand_size: self.brand_size * factor,
            confidence_size: self.confidence_size.map(|s| s * factor),
            text_inset: self.text_inset * factor,
            ..self
        }
    }

    /// Grow the metrics for images larger than the reference edge.
    pub fn for_resolution(self, natural: (u32, u32)) -> Self {
        let long_edge = natural.0.max(natural.1) as f32;
        self.scaled((long_edge / Self::REFERENCE_EDGE).max(1.0))
    }
}

/// Build the draw list for `result` on a surface described by `geometry`.
///
/// A degenerate box (as in the failure result) only clears the surface.
pub fn overlay_instructions(
    result: &DetectionResult,
    geometry: &Geometry,
    style: &OverlayStyle,
) -> Vec<DrawOp> {
    let mut ops = vec![DrawOp::Clear];
    if result.bbox.is_degenerate() {
        return ops;
    }

    let rect = scale_box(&result.bbox, geometry.natural, geometry.surface);
    if rect.w <= 0.0 || rect.h <= 0.0 {
        return ops;
    }

    ops.push(DrawOp::StrokeRect {
        rect,
        width: style.stroke_width,
        color: Rgba::BOX,
    });

    let label = Rect::new(
        rect.x,
        rect.y - style.label_height,
        rect.w.max(style.label_min_width),
        style.label_height,
    );
    ops.push(DrawOp::FillRect {
        rect: label,
        color: Rgba::label(style.label_alpha),
    });

    let mut lines = vec![(result.brand.clone(), style.brand_size)];
    if let Some(size) = style.confidence_size {
        lines.push((result.confidence_label(), size));
    }
    let text_height: f32 = lines.iter().map(|(_, size)| size).sum();
    let gap = ((style.label_height - text_height) / (lines.len() + 1) as f32).max(0.0);

    let mut y = label.y + gap;
    for (text, size) in lines {
        ops.push(DrawOp::Text {
            x: label.x + style.text_inset,
            y,
            size,
            text,
            color: Rgba::TEXT,
        });
        y += size + gap;
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::BoundingBox;

    fn result(bbox: BoundingBox) -> DetectionResult {
        DetectionResult {
            brand: "BMW".into(),
            confidence: 0.873,
            latency: "90ms".into(),
            bbox,
            model_info: None,
            error: None,
        }
    }

    #[test]
    fn test_inline_overlay_scales_box() {
        let geometry = Geometry {
            surface: (500.0, 400.0),
            natural: (1000, 800),
        };
        let ops = overlay_instructions(
            &result(BoundingBox::new(100.0, 100.0, 200.0, 150.0)),
            &geometry,
            &OverlayStyle::INLINE,
        );

        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0], DrawOp::Clear);
        assert_eq!(
            ops[1],
            DrawOp::StrokeRect {
                rect: Rect::new(50.0, 50.0, 100.0, 75.0),
                width: 3.0,
                color: Rgba::BOX,
            }
        );
        // Label sits immediately above the box
        match &ops[2] {
            DrawOp::FillRect { rect, .. } => assert_eq!(*rect, Rect::new(50.0, 20.0, 100.0, 30.0)),
            other => panic!("expected label background, got {:?}", other),
        }
        match &ops[3] {
            DrawOp::Text { text, x, .. } => {
                assert_eq!(text, "BMW");
                assert_eq!(*x, 60.0);
            }
            other => panic!("expected label text, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_box_only_clears() {
        let ops = overlay_instructions(
            &DetectionResult::failure("offline"),
            &Geometry::natural((640, 480)),
            &OverlayStyle::INLINE,
        );
        assert_eq!(ops, vec![DrawOp::Clear]);
    }

    #[test]
    fn test_viewer_label_has_two_lines_and_min_width() {
        let ops = overlay_instructions(
            &result(BoundingBox::new(100.0, 200.0, 120.0, 90.0)),
            &Geometry::natural((800, 600)),
            &OverlayStyle::VIEWER,
        );
        let texts: Vec<&str> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["BMW", "87%"]);

        let label_width = ops.iter().find_map(|op| match op {
            DrawOp::FillRect { rect, .. } => Some(rect.w),
            _ => None,
        });
        assert_eq!(label_width, Some(300.0));
    }

    #[test]
    fn test_resolution_scaling_only_grows() {
        let small = OverlayStyle::VIEWER.for_resolution((640, 480));
        assert_eq!(small, OverlayStyle::VIEWER);

        let large = OverlayStyle::VIEWER.for_resolution((2560, 1440));
        assert_eq!(large.stroke_width, 16.0);
        assert_eq!(large.brand_size, 96.0);
        assert!(large.stroke_width > OverlayStyle::INLINE.stroke_width);
    }
}
