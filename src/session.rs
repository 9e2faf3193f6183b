// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session controller.
//!
//! Owns the single live record of the current image and result for one
//! run of the application. All mutation goes through the transition
//! functions here; the UI and the headless CLI only dispatch into them.

use crate::error::AppError;
use crate::io::intake;
use crate::models::detection::DetectionResult;
use crate::models::source::{DisplayHandle, FileCandidate, SourceImage, Upload};

/// Enabled state of the controls that depend on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub analyze: bool,
    pub view: bool,
    pub save: bool,
    pub copy: bool,
}

/// Proof that an analysis was started for a particular image.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub handle: DisplayHandle,
    pub upload: Upload,
}

/// Currently loaded image together with its display handle.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub handle: DisplayHandle,
    pub source: SourceImage,
}

/// The session state and its transitions.
#[derive(Debug, Default)]
pub struct Session {
    image: Option<LoadedImage>,
    result: Option<DetectionResult>,
    in_flight: Option<DisplayHandle>,
    next_handle: u64,
    released: Vec<DisplayHandle>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a candidate file. Never changes state.
    pub fn submit(&self, candidate: &FileCandidate) -> Result<(), AppError> {
        intake::validate(candidate)
    }

    /// Install a freshly decoded image.
    ///
    /// Releases the previous display handle, allocates a new one and drops
    /// any result or pending analysis that belonged to the previous image.
    pub fn accept_decoded(&mut self, source: SourceImage) -> DisplayHandle {
        self.release_image();
        self.in_flight = None;
        self.next_handle += 1;
        let handle = DisplayHandle(self.next_handle);
        let (w, h) = source.natural_size();
        log::info!("Preview active: {} ({}x{}), handle {:?}", source.name(), w, h, handle);
        self.image = Some(LoadedImage { handle, source });
        self.result = None;
        handle
    }

    /// Start an analysis of the current image.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, AppError> {
        if self.in_flight.is_some() {
            return Err(AppError::Busy);
        }
        let loaded = self.image.as_ref().ok_or(AppError::NoImage)?;
        self.in_flight = Some(loaded.handle);
        Ok(AnalysisTicket {
            handle: loaded.handle,
            upload: loaded.source.upload.clone(),
        })
    }

    /// Settle an analysis.
    ///
    /// The result is stored only when the image it was computed for is
    /// still the current one; returns whether it was stored. A stale ticket
    /// never settles a newer analysis.
    pub fn finish_analysis(&mut self, ticket: AnalysisTicket, result: DetectionResult) -> bool {
        if self.in_flight == Some(ticket.handle) {
            self.in_flight = None;
        }
        match &self.image {
            Some(loaded) if loaded.handle == ticket.handle => {
                self.result = Some(result);
                true
            }
            _ => {
                log::warn!(
                    "Discarding result for {:?}: image was replaced or cleared",
                    ticket.handle
                );
                false
            }
        }
    }

    /// Reset to {no image, no result}.
    pub fn clear(&mut self) {
        self.release_image();
        self.result = None;
        self.in_flight = None;
        log::info!("Session cleared");
    }

    pub fn controls(&self) -> Controls {
        let has_image = self.image.is_some();
        let has_result = has_image && self.result.is_some();
        Controls {
            analyze: has_image && self.in_flight.is_none(),
            view: has_result,
            save: has_result,
            copy: has_result,
        }
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    /// Current result, only while its image is still loaded.
    pub fn result(&self) -> Option<&DetectionResult> {
        self.image.as_ref().and(self.result.as_ref())
    }

    pub fn display_handle(&self) -> Option<DisplayHandle> {
        self.image.as_ref().map(|loaded| loaded.handle)
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Handles released since the last call, for the display layer to free.
    pub fn take_released(&mut self) -> Vec<DisplayHandle> {
        std::mem::take(&mut self.released)
    }

    fn release_image(&mut self) {
        if let Some(old) = self.image.take() {
            log::debug!("Releasing display handle {:?}", old.handle);
            self.released.push(old.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::BoundingBox;
    use image::RgbaImage;

    fn source(name: &str, w: u32, h: u32) -> SourceImage {
        SourceImage {
            upload: Upload {
                file_name: name.to_string(),
                media_type: "image/png".to_string(),
                bytes: vec![1, 2, 3],
            },
            pixels: RgbaImage::new(w, h),
        }
    }

    fn success() -> DetectionResult {
        DetectionResult {
            brand: "Audi".into(),
            confidence: 0.91,
            latency: "120ms".into(),
            bbox: BoundingBox::new(10.0, 10.0, 50.0, 40.0),
            model_info: None,
            error: None,
        }
    }

    const NONE: Controls = Controls {
        analyze: false,
        view: false,
        save: false,
        copy: false,
    };
    const ALL: Controls = Controls {
        analyze: true,
        view: true,
        save: true,
        copy: true,
    };

    #[test]
    fn test_controls_without_image() {
        assert_eq!(Session::new().controls(), NONE);
    }

    #[test]
    fn test_controls_after_decode() {
        let mut session = Session::new();
        session.accept_decoded(source("car.png", 640, 480));
        assert_eq!(
            session.controls(),
            Controls {
                analyze: true,
                ..NONE
            }
        );
    }

    #[test]
    fn test_controls_after_success_and_failure() {
        let mut session = Session::new();
        session.accept_decoded(source("car.png", 640, 480));

        let ticket = session.begin_analysis().unwrap();
        assert!(!session.controls().analyze);
        assert!(session.finish_analysis(ticket, success()));
        assert_eq!(session.controls(), ALL);

        let ticket = session.begin_analysis().unwrap();
        assert!(session.finish_analysis(ticket, DetectionResult::failure("refused")));
        assert_eq!(session.controls(), ALL);
        assert_eq!(session.result().unwrap().brand, "Error");
    }

    #[test]
    fn test_single_analysis_in_flight() {
        let mut session = Session::new();
        assert!(matches!(session.begin_analysis(), Err(AppError::NoImage)));

        session.accept_decoded(source("car.png", 10, 10));
        let _ticket = session.begin_analysis().unwrap();
        assert!(matches!(session.begin_analysis(), Err(AppError::Busy)));
    }

    #[test]
    fn test_clear_after_analysis() {
        let mut session = Session::new();
        let handle = session.accept_decoded(source("car.png", 10, 10));
        let ticket = session.begin_analysis().unwrap();
        session.finish_analysis(ticket, success());

        session.clear();
        assert!(session.image().is_none());
        assert!(session.result().is_none());
        assert_eq!(session.controls(), NONE);
        assert_eq!(session.take_released(), vec![handle]);
    }

    #[test]
    fn test_new_image_releases_handle_and_hides_result() {
        let mut session = Session::new();
        let first = session.accept_decoded(source("a.png", 10, 10));
        let ticket = session.begin_analysis().unwrap();
        session.finish_analysis(ticket, success());

        let second = session.accept_decoded(source("b.png", 20, 20));
        assert_ne!(first, second);
        assert_eq!(session.take_released(), vec![first]);
        assert!(session.result().is_none());
        assert_eq!(session.display_handle(), Some(second));
    }

    #[test]
    fn test_orphaned_result_is_discarded() {
        let mut session = Session::new();
        session.accept_decoded(source("a.png", 10, 10));
        let ticket = session.begin_analysis().unwrap();

        session.clear();
        assert!(!session.finish_analysis(ticket, success()));
        assert!(session.result().is_none());
        assert!(!session.is_analyzing());

        session.accept_decoded(source("b.png", 10, 10));
        let stale = session.begin_analysis().unwrap();
        session.accept_decoded(source("c.png", 10, 10));
        assert!(!session.finish_analysis(stale, success()));
        assert!(session.controls().analyze);
    }

    #[test]
    fn test_pending_analysis_does_not_block_next_image() {
        let mut session = Session::new();
        session.accept_decoded(source("a.png", 10, 10));
        let hung = session.begin_analysis().unwrap();

        session.clear();
        assert!(!session.is_analyzing());
        session.accept_decoded(source("b.png", 10, 10));
        assert!(session.controls().analyze);

        // Replacing the image mid-request re-enables Analyze as well
        let replaced = session.begin_analysis().unwrap();
        session.accept_decoded(source("c.png", 10, 10));
        assert!(session.controls().analyze);

        // Late answers for old images leave the current request in flight
        let current = session.begin_analysis().unwrap();
        assert!(!session.finish_analysis(hung, success()));
        assert!(!session.finish_analysis(replaced, success()));
        assert!(session.is_analyzing());
        assert!(!session.controls().analyze);

        assert!(session.finish_analysis(current, success()));
        assert_eq!(session.controls(), ALL);
    }

    #[test]
    fn test_submit_rejects_without_state_change() {
        let mut session = Session::new();
        let handle = session.accept_decoded(source("a.png", 10, 10));
        let candidate = FileCandidate {
            name: "notes.txt".into(),
            media_type: "text/plain".into(),
            bytes: b"hello".to_vec(),
        };
        assert!(matches!(
            session.submit(&candidate),
            Err(AppError::InvalidFileType { .. })
        ));
        assert_eq!(session.display_handle(), Some(handle));
    }
}
