// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Offline demo mode.
//!
//! A detector that answers without a service, and a synthetic sample image
//! to feed it, so the whole flow can be tried with no backend running.

use super::detection_client::Detector;
use crate::error::AppError;
use crate::models::detection::{BoundingBox, DetectionResponse};
use crate::models::source::{FileCandidate, Upload};
use crate::render::composite::rasterize;
use crate::render::overlay::{DrawOp, Rgba};
use image::RgbaImage;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

pub const DEMO_BRANDS: [&str; 7] = ["BMW", "Mercedes", "Toyota", "Audi", "Tesla", "Honda", "Ford"];

/// Detector that makes up a plausible answer.
#[derive(Debug, Clone, Default)]
pub struct DemoDetector {
    /// Skip the simulated round trip.
    pub instant: bool,
}

impl Detector for DemoDetector {
    fn detect(&self, _upload: &Upload) -> Result<DetectionResponse, AppError> {
        let mut rng = rand::thread_rng();
        if !self.instant {
            std::thread::sleep(Duration::from_millis(rng.gen_range(800..1200)));
        }
        let brand = DEMO_BRANDS.choose(&mut rng).copied().unwrap_or("BMW");
        Ok(DetectionResponse {
            brand: Some(brand.to_string()),
            confidence: Some(rng.gen_range(0.85..0.97)),
            latency: None,
            bbox: Some(BoundingBox::PLACEHOLDER),
            model_info: None,
            error: None,
        })
    }

    fn name(&self) -> &str {
        "demo"
    }
}

/// 400x300 blue PNG with a white "BMW" label.
pub fn demo_image() -> Result<FileCandidate, AppError> {
    let mut canvas = RgbaImage::from_pixel(400, 300, image::Rgba([0x1e, 0x40, 0xaf, 0xff]));
    rasterize(
        &mut canvas,
        &[DrawOp::Text {
            x: 160.0,
            y: 124.0,
            size: 48.0,
            text: "BMW".to_string(),
            color: Rgba([0xff, 0xff, 0xff, 0xff]),
        }],
    );
    let bytes = super::export::encode_image(&canvas, super::export::ExportFormat::Png)?;
    Ok(FileCandidate {
        name: "demo.png".to_string(),
        media_type: "image/png".to_string(),
        bytes,
    })
}
