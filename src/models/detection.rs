// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection result data structures.
//!
//! This module defines the canonical result record produced by every
//! detection attempt (success or failure alike) and the wire shapes the
//! detection service speaks.

use serde::{Deserialize, Serialize};

/// Brand reported by the failure result.
pub const ERROR_BRAND: &str = "Error";

/// Axis-aligned box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    /// Box used when the service omits one.
    pub const PLACEHOLDER: BoundingBox = BoundingBox {
        x: 50.0,
        y: 50.0,
        w: 200.0,
        h: 150.0,
    };

    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// True when the box has no visible area.
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }
}

/// Canonical outcome of one detection attempt.
///
/// Replaced wholesale by the next analysis, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub brand: String,
    /// Score in `[0, 1]`.
    pub confidence: f64,
    pub latency: String,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_info: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResult {
    /// Failure result carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            brand: ERROR_BRAND.to_string(),
            confidence: 0.0,
            latency: "0ms".to_string(),
            bbox: BoundingBox::default(),
            model_info: None,
            error: Some(message.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Confidence as a rounded percentage, e.g. `0.873 -> "87%"`.
    pub fn confidence_label(&self) -> String {
        format_confidence(self.confidence)
    }

    /// Short tags derived from the scalar values of `model_info`.
    pub fn tags(&self) -> Vec<String> {
        let Some(serde_json::Value::Object(info)) = &self.model_info else {
            return Vec::new();
        };
        info.values()
            .filter_map(|value| match value {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }
}

/// Format a `[0, 1]` score as a whole percentage.
pub fn format_confidence(confidence: f64) -> String {
    let percent = if confidence.is_finite() {
        (confidence * 100.0).round()
    } else {
        0.0
    };
    format!("{}%", percent as i64)
}

/// Body of `POST /api/detect` as sent by the service.
///
/// Everything is optional here; the client decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionResponse {
    pub brand: Option<String>,
    pub confidence: Option<f64>,
    pub latency: Option<String>,
    #[serde(rename = "box")]
    pub bbox: Option<BoundingBox>,
    pub model_info: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Body of `GET /` (service health check).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub supported_brands: u32,
    #[serde(default)]
    pub max_file_size: Option<String>,
}

/// Body of `GET /api/brands`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandList {
    pub brands: Vec<String>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub model_version: Option<String>,
}
