//! Face Detection Pipeline
//!
//! Per-frame face analysis for the sentry loop:
//! - Region detection capability seam (cascade runtimes are external)
//! - Face validation: exactly two eyes and exactly one nose inside a
//!   candidate face region
//! - Single-flight background scheduling so a slow analysis pass never
//!   stalls frame acquisition

pub mod analyzer;
pub mod region;
pub mod scheduler;

pub use analyzer::{AnalyzerConfig, FaceAnalyzer, FaceCrop, FrameAnalyzer};
pub use region::{DetectParams, MockRegionDetector, Region, RegionDetector};
pub use scheduler::AnalysisScheduler;
