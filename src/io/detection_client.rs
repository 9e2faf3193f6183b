// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection service client.
//!
//! Sends the active image to the remote detection service and normalizes
//! whatever comes back (or the failure) into a [`DetectionResult`].

use crate::config::Settings;
use crate::error::AppError;
use crate::models::detection::{
    BoundingBox, BrandList, DetectionResponse, DetectionResult, ServerStatus,
};
use crate::models::source::Upload;
use reqwest::blocking::{multipart, Client};
use std::time::{Duration, Instant};

/// Path of the detection route relative to the configured base address.
pub const DETECT_PATH: &str = "/api/detect";
/// Multipart field carrying the raw image bytes.
pub const IMAGE_FIELD: &str = "image";

/// Anything that can answer a detection request.
pub trait Detector: Send + Sync {
    /// Issue one request for `upload`. No retries.
    fn detect(&self, upload: &Upload) -> Result<DetectionResponse, AppError>;

    /// Short name for logs and the status bar.
    fn name(&self) -> &str;
}

/// Run one detection and normalize the outcome.
///
/// Never fails: transport and application errors become the failure
/// result so they render through the same path as a success.
pub fn analyze(detector: &dyn Detector, upload: &Upload) -> DetectionResult {
    log::info!("Sending {} to {} detector", upload.file_name, detector.name());
    let start = Instant::now();
    let outcome = detector
        .detect(upload)
        .and_then(|response| normalize(response, start.elapsed()));

    match outcome {
        Ok(result) => {
            log::info!(
                "Detected {} ({}) in {}",
                result.brand,
                result.confidence_label(),
                result.latency
            );
            result
        }
        Err(e) => {
            log::error!("Analysis failed: {}", e);
            DetectionResult::failure(e.to_string())
        }
    }
}

/// Turn a parsed response into a result, applying the documented defaults.
///
/// A present `error` field is a failure even on a 2xx response. Missing
/// `latency` defaults to the measured round trip and a missing `box` to
/// [`BoundingBox::PLACEHOLDER`].
pub fn normalize(
    response: DetectionResponse,
    elapsed: Duration,
) -> Result<DetectionResult, AppError> {
    if let Some(error) = response.error {
        return Err(AppError::Application(error));
    }
    let (Some(brand), Some(confidence)) = (response.brand, response.confidence) else {
        return Err(AppError::Transport(
            "response is missing brand or confidence".to_string(),
        ));
    };
    if response.bbox.is_none() || response.latency.is_none() {
        log::debug!("Response omitted box or latency; applying defaults");
    }

    Ok(DetectionResult {
        brand,
        confidence: if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        },
        latency: response
            .latency
            .unwrap_or_else(|| format!("{}ms", elapsed.as_millis())),
        bbox: response.bbox.unwrap_or(BoundingBox::PLACEHOLDER),
        model_info: response.model_info,
        error: None,
    })
}

/// Detector backed by the HTTP service.
#[derive(Debug, Clone)]
pub struct HttpDetector {
    client: Client,
    base_url: String,
}

impl HttpDetector {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("carbrands/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /`: whether the service is up and has its model loaded.
    pub fn health(&self) -> Result<ServerStatus, AppError> {
        self.get_json(&format!("{}/", self.base_url))
    }

    /// `GET /api/brands`: the brands the model can recognize.
    pub fn brands(&self) -> Result<BrandList, AppError> {
        self.get_json(&format!("{}/api/brands", self.base_url))
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send()?;
        let response = check_status(response)?;
        Ok(response.json()?)
    }
}

impl Detector for HttpDetector {
    fn detect(&self, upload: &Upload) -> Result<DetectionResponse, AppError> {
        let part = multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.media_type)?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        let url = format!("{}{}", self.base_url, DETECT_PATH);
        log::debug!("POST {} ({} bytes)", url, upload.bytes.len());
        let response = self.client.post(&url).multipart(form).send()?;
        let response = check_status(response)?;
        Ok(response.json()?)
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(AppError::Transport(format!(
            "API Error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )))
    }
}
