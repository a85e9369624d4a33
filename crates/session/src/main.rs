//! Face Sentry - Main Entry Point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use camera_capture::{JpegFileSink, SyntheticSource};
use clap::Parser;
use face_detect::{
    AnalysisScheduler, AnalyzerConfig, FaceAnalyzer, MockRegionDetector, RegionDetector,
};
use face_registry::{FaceRecognizer, LabelRegistry, SampleStore, TemplateRecognizer};
use range_sensor::{DistanceSampler, MonotonicClock, RangeSensor, SysfsGpio};
use session::overlay::OverlayRenderer;
use session::{init_logging, Session, SessionConfig};
use tracing::{info, warn};

const CASCADE_FILES: [&str; 3] = [
    "haarcascade_frontalface_default.xml",
    "haarcascade_eye.xml",
    "haarcascade_mcs_nose.xml",
];

#[derive(Parser, Debug)]
#[command(name = "face-sentry", version, about = "Embedded face recognition sentry loop")]
struct Cli {
    /// Run face detection and recognition on captured frames
    #[arg(long)]
    analyze: bool,

    /// Capture training samples for this identity
    #[arg(long, value_name = "IDENTITY")]
    train: Option<String>,

    /// Root data directory (training images, output image, stop file)
    #[arg(long, default_value = "data")]
    root: PathBuf,

    /// Cascade asset directory supplied by the detection collaborator
    #[arg(long)]
    cascades: Option<PathBuf>,

    /// Disable the ultrasonic distance sensor
    #[arg(long)]
    no_ranging: bool,

    /// Sensor trigger pin (BCM numbering)
    #[arg(long, default_value_t = 23)]
    trigger_pin: u32,

    /// Sensor echo pin (BCM numbering)
    #[arg(long, default_value_t = 24)]
    echo_pin: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    info!("=== Face Sentry v{} ===", env!("CARGO_PKG_VERSION"));

    let config = SessionConfig {
        analysis_enabled: cli.analyze,
        training_identity: cli.train.filter(|identity| !identity.is_empty()),
        training_dir: cli.root.join("faceimages"),
        cascade_dir: cli.cascades,
        output_image: cli.root.join("image.jpg"),
        stop_file: cli.root.join("stop-video-capture.txt"),
        ranging_enabled: !cli.no_ranging,
        trigger_pin: cli.trigger_pin,
        echo_pin: cli.echo_pin,
        ..Default::default()
    };

    info!(
        "Face Recognition Mode...{}",
        if config.analysis_enabled { "ON" } else { "OFF" }
    );
    if let Some(identity) = &config.training_identity {
        info!("Training Mode...ON...{identity}");
    }

    // Training images feed both the registry and the recognizer
    std::fs::create_dir_all(&config.training_dir)?;
    let store = SampleStore::new(&config.training_dir);
    let mut registry = LabelRegistry::new();
    let training_set = store.load_all(&mut registry)?;

    let recognizer: Option<Box<dyn FaceRecognizer>> = if registry.len() >= 2 {
        info!("Training face recognizer...");
        let mut recognizer = TemplateRecognizer::new();
        recognizer.train(&training_set)?;
        Some(Box::new(recognizer))
    } else {
        info!(
            identities = registry.len(),
            "Skipping recognizer training; fewer than 2 identities"
        );
        None
    };

    let scheduler = if config.analysis_enabled {
        let (face, eye, nose) = load_detectors(config.cascade_dir.as_deref())?;
        let analyzer_config = AnalyzerConfig {
            draw_markers: !config.training_mode(),
            ..Default::default()
        };
        Some(AnalysisScheduler::new(FaceAnalyzer::new(
            face,
            eye,
            nose,
            analyzer_config,
        )))
    } else {
        None
    };

    let sampler: Option<Box<dyn DistanceSampler>> = if config.ranging_enabled {
        let gpio = SysfsGpio::new(config.trigger_pin, config.echo_pin)?;
        Some(Box::new(RangeSensor::new(
            gpio,
            MonotonicClock::new(),
            config.range.clone(),
        )))
    } else {
        info!("Ranging disabled");
        None
    };

    let source = Box::new(SyntheticSource::new(&config.camera));
    let sink = Box::new(JpegFileSink::new(&config.output_image));
    let overlay = OverlayRenderer::new(config.font_path.as_deref());

    let mut session = Session::new(
        config, source, sink, scheduler, sampler, store, registry, recognizer, overlay,
    );
    session.run()?;
    Ok(())
}

/// Validate collaborator cascade assets and construct the region
/// detectors.
///
/// No cascade runtime is linked into this build, so detection falls
/// back to deterministic mock regions; a real backend plugs in behind
/// [`RegionDetector`].
#[allow(clippy::type_complexity)]
fn load_detectors(
    cascade_dir: Option<&Path>,
) -> Result<
    (
        Arc<dyn RegionDetector>,
        Arc<dyn RegionDetector>,
        Arc<dyn RegionDetector>,
    ),
    Box<dyn std::error::Error>,
> {
    if let Some(dir) = cascade_dir {
        for file in CASCADE_FILES {
            let path = dir.join(file);
            if !path.is_file() {
                return Err(format!("Missing cascade file {}", path.display()).into());
            }
            info!("Loading cascade {}", path.display());
        }
    }
    warn!("No cascade runtime linked. Using mock region detectors.");
    Ok((
        Arc::new(MockRegionDetector::face()),
        Arc::new(MockRegionDetector::eyes()),
        Arc::new(MockRegionDetector::nose()),
    ))
}
