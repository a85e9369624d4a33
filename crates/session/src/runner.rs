//! The continuous capture/analysis session loop

use std::time::Instant;

use camera_capture::{Frame, FrameSink, FrameSource};
use chrono::Local;
use face_detect::{AnalysisScheduler, FrameAnalyzer};
use face_registry::{FaceRecognizer, LabelRegistry, SampleStore, SAMPLE_SIZE};
use image::imageops::{self, FilterType};
use imageproc::contrast::equalize_histogram;
use range_sensor::DistanceSampler;
use tracing::{info, warn};

use crate::overlay::OverlayRenderer;
use crate::state::{DisplayedPrediction, SessionState};
use crate::{SessionConfig, SessionError};

/// The session loop and its collaborators.
///
/// One primary loop thread; the only concurrency is the scheduler's
/// single background analysis task. The registry and sample store are
/// mutated exclusively from this thread.
pub struct Session<A: FrameAnalyzer> {
    config: SessionConfig,
    source: Box<dyn FrameSource>,
    sink: Box<dyn FrameSink>,
    scheduler: Option<AnalysisScheduler<A>>,
    sampler: Option<Box<dyn DistanceSampler>>,
    store: SampleStore,
    registry: LabelRegistry,
    recognizer: Option<Box<dyn FaceRecognizer>>,
    overlay: OverlayRenderer,
    state: SessionState,
}

impl<A: FrameAnalyzer> Session<A> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SessionConfig,
        source: Box<dyn FrameSource>,
        sink: Box<dyn FrameSink>,
        scheduler: Option<AnalysisScheduler<A>>,
        sampler: Option<Box<dyn DistanceSampler>>,
        store: SampleStore,
        registry: LabelRegistry,
        recognizer: Option<Box<dyn FaceRecognizer>>,
        overlay: OverlayRenderer,
    ) -> Self {
        let state = SessionState::new(config.max_training_samples);
        Self {
            config,
            source,
            sink,
            scheduler,
            sampler,
            store,
            registry,
            recognizer,
            overlay,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run until the stop file appears
    pub fn run(&mut self) -> Result<(), SessionError> {
        info!("Starting capture loop");
        loop {
            self.tick()?;
            if self.consume_stop_signal()? {
                break;
            }
        }
        info!("Stopping camera");
        Ok(())
    }

    /// One loop iteration: acquire, analyze, composite, sample, emit
    pub fn tick(&mut self) -> Result<(), SessionError> {
        let mut frame = self.source.acquire()?;
        frame.orient(self.config.camera.orientation);
        self.state.frames_seen += 1;
        let fps = self.state.fps.tick(Instant::now());

        if self.scheduler.is_some() {
            self.process_analysis(&frame);
            self.render_recognition(&mut frame);
        }

        let training = self
            .config
            .training_identity
            .as_deref()
            .map(|identity| (identity, self.state.training.count(), self.state.training.max()));
        self.overlay.status_text(
            &mut frame,
            self.scheduler.is_some(),
            training,
            fps,
            Local::now(),
        );

        self.sample_distance();
        self.overlay.distance_text(&mut frame, self.state.distance_cm);

        if let Err(e) = self.sink.emit(&frame) {
            warn!("Frame emit failed: {e}");
        }
        Ok(())
    }

    /// Poll the background analysis; on a fresh nonempty result, cache
    /// the first crop and capture it for training when active
    fn process_analysis(&mut self, frame: &Frame) {
        let Some(scheduler) = &mut self.scheduler else {
            return;
        };
        let Some(crops) = scheduler.poll(frame) else {
            return;
        };
        if crops.is_empty() {
            return;
        }
        info!(faces = crops.len(), "Face(s) detected");

        let Some(first) = crops.into_iter().next() else {
            return;
        };
        let resized = imageops::resize(&first.image, SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle);
        let captured_at = Local::now();

        if let Some(identity) = &self.config.training_identity {
            if self.state.training.accept() {
                if let Err(e) = self.store.append(identity, &resized, captured_at) {
                    warn!("Training capture failed: {e}");
                }
            }
        }

        self.state.current_crop = Some(resized);
        self.state.crop_captured_at = Some(captured_at);
    }

    /// Composite the cached crop and, when a trained recognizer exists,
    /// its identity/confidence/timestamp details
    fn render_recognition(&mut self, frame: &mut Frame) {
        let Some(crop) = &self.state.current_crop else {
            return;
        };
        self.overlay.composite_crop(frame, crop);

        let Some(recognizer) = &self.recognizer else {
            return;
        };
        let gray = equalize_histogram(&imageops::grayscale(crop));
        let Some(prediction) = recognizer.predict(&gray) else {
            return;
        };
        let name = self
            .registry
            .name(prediction.label)
            .unwrap_or("unknown")
            .to_string();
        let captured_at = self.state.crop_captured_at.unwrap_or_else(Local::now);
        self.overlay
            .recognition_block(frame, &name, prediction.confidence, captured_at);
        self.state.last_prediction = Some(DisplayedPrediction {
            name,
            confidence: prediction.confidence,
        });
    }

    /// Re-measure every Nth frame; a failed cycle retains the last
    /// known reading
    fn sample_distance(&mut self) {
        let Some(sampler) = &mut self.sampler else {
            return;
        };
        let interval = self.config.distance_interval.max(1);
        if (self.state.frames_seen - 1) % interval != 0 {
            return;
        }
        match sampler.measure() {
            Ok(cm) => self.state.distance_cm = cm,
            Err(e) => warn!("No distance reading this cycle: {e}"),
        }
    }

    /// A stop file requests graceful shutdown and is deleted on
    /// consumption
    fn consume_stop_signal(&self) -> Result<bool, SessionError> {
        if !self.config.stop_file.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.config.stop_file)?;
        info!("Stop file consumed; shutting down");
        Ok(true)
    }
}
