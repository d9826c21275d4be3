//! Leather Defect Detection - Demo Entry Point
//!
//! Wires SyntheticCamera -> Pipeline -> Presenter with a replayed model
//! bundle and prints the final engine status as JSON.

use std::sync::Arc;
use std::time::Duration;

use leather_defect_core::api::engine_status;
use leather_defect_core::constants;
use leather_defect_core::logic::capture::{FrameSink, FrameSource, SyntheticCamera};
use leather_defect_core::logic::overlay::{LogTelemetryDisplay, OverlayState};
use leather_defect_core::logic::torch::{FlashControl, SimulatedTorch};
use leather_defect_core::logic::{Pipeline, PipelineConfig, Presenter, ReplayDetector};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    let config = PipelineConfig::from_env()?;

    // No model, no app
    let detector = match ReplayDetector::load(&config.model_path, config.model_sha256.as_deref()) {
        Ok(detector) => Arc::new(detector),
        Err(e) => {
            log::error!("Failed to create detection model: {}", e);
            return Err(e.into());
        }
    };
    let metadata = detector.metadata().clone();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let (pipeline, updates) = Pipeline::new(detector, &config, runtime.handle().clone());
    let pipeline = Arc::new(pipeline);

    let overlay = OverlayState::new();
    let presenter = Presenter::new(
        Box::new(overlay.clone()),
        Box::new(LogTelemetryDisplay::new(u64::from(config.target_fps))),
        config.smoothing_window,
    )?;
    let presenter_task = runtime.spawn(presenter.run(updates));

    let mut flash = FlashControl::new(Box::new(SimulatedTorch::default()));
    if constants::is_torch_requested() {
        flash.toggle();
    }

    let sink_pipeline = pipeline.clone();
    let sink: FrameSink = Arc::new(move |frame| {
        sink_pipeline.on_frame(frame);
    });
    let mut camera = SyntheticCamera::new(config.target_fps, sink);

    camera.start();
    std::thread::sleep(Duration::from_secs(constants::get_run_seconds()));
    camera.stop();
    log::info!("Camera delivered {} frames", camera.frames_delivered());
    drop(camera);

    // Let the last admitted frame finish
    while pipeline.is_busy() {
        std::thread::sleep(Duration::from_millis(10));
    }

    let mut status = engine_status::collect(&pipeline, Some(&metadata), &overlay, None);
    drop(pipeline);

    let presenter = runtime.block_on(presenter_task)?;
    status.telemetry = Some(presenter.telemetry());

    if flash.is_on() {
        flash.toggle();
    }

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
