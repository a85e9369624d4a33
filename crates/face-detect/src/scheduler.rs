//! Single-flight background analysis scheduling

use std::sync::Arc;
use std::thread::JoinHandle;

use camera_capture::Frame;
use tracing::{error, warn};

use crate::analyzer::{FaceCrop, FrameAnalyzer};

/// Scheduler state, observable for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// No analysis outstanding
    Idle,
    /// One background task in flight
    Running,
}

/// Runs a [`FrameAnalyzer`] as a non-blocking background task.
///
/// At most one task is ever in flight, bounding memory to one
/// outstanding frame clone. Results lag the frame they were computed
/// from by however many iterations the analysis took; the loop applies
/// them to whichever frame is current. Once launched a task always runs
/// to completion, there is no cancellation path.
pub struct AnalysisScheduler<A> {
    analyzer: Arc<A>,
    task: Option<JoinHandle<Vec<FaceCrop>>>,
}

impl<A: FrameAnalyzer> AnalysisScheduler<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            task: None,
        }
    }

    pub fn state(&self) -> TaskState {
        if self.task.is_some() {
            TaskState::Running
        } else {
            TaskState::Idle
        }
    }

    /// Poll once per loop iteration.
    ///
    /// Idle: clones `frame`, launches analysis on the clone, returns
    /// `None`. Running: returns `None` without blocking. Completed:
    /// returns the result (possibly empty) exactly once and goes idle;
    /// the next poll starts a fresh task.
    pub fn poll(&mut self, frame: &Frame) -> Option<Vec<FaceCrop>> {
        match self.task.take() {
            None => {
                self.start(frame);
                None
            }
            Some(handle) if handle.is_finished() => match handle.join() {
                Ok(crops) => Some(crops),
                Err(_) => {
                    error!("Analysis task panicked; treating as empty result");
                    Some(Vec::new())
                }
            },
            Some(handle) => {
                self.task = Some(handle);
                None
            }
        }
    }

    fn start(&mut self, frame: &Frame) {
        let analyzer = Arc::clone(&self.analyzer);
        let snapshot = frame.clone();
        let spawned = std::thread::Builder::new()
            .name("face-analysis".into())
            .spawn(move || analyzer.analyze(&snapshot));
        match spawned {
            Ok(handle) => self.task = Some(handle),
            Err(e) => warn!("Could not spawn analysis task: {e}"),
        }
    }
}
