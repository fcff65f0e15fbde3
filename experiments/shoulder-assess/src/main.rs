mod preview;
mod terminal;
mod trimmer;

use {
    anyhow::{Context, Result},
    assess::{AssessConfig, AssessError, HttpServices, Orchestrator, Stage},
    audio::{AudioOut, AudioOutConfig},
    base::{init_file_logger, init_stdout_logger, log_fatal},
    capture::{FrameCompositor, FrameLoop, RecordingSession, SURFACE_SIZE},
    minifb::Key,
    pose::{PoseEstimator, movenet::MoveNet},
    preview::Preview,
    speak::{HttpSpeechSynth, Speaker},
    std::{env, path::PathBuf, sync::Arc},
    trimmer::{TrimAction, Trimmer},
    video::VideoIn,
};

/// Camera preview until the user has recorded the movement. Returns false if
/// the window was closed first.
async fn capture(
    video: &mut VideoIn,
    frame_loop: &mut FrameLoop,
    orchestrator: &mut Orchestrator,
    speaker: &Speaker,
    preview: &mut Preview,
) -> Result<bool> {
    preview.set_title("Shoulder assessment | Space starts and stops recording, Esc quits");
    while preview.is_open() {
        let frame = video.latest().await?;
        let tick = frame_loop.tick(frame).await?;
        if let Some(event) = &tick.event {
            speaker.say(event.text());
        }
        if orchestrator.stage() == Stage::Recording {
            orchestrator.record_pose(tick.captured_at, tick.pose.clone())?;
        }
        preview.show(&tick.surface)?;

        for key in preview.keys() {
            match (key, orchestrator.stage()) {
                (Key::Escape, _) => return Ok(false),
                (Key::Space, Stage::AwaitingCapture) => {
                    orchestrator.start_recording(frame_loop.compositor().stream()?)?;
                    if let Some(presence) = frame_loop.presence_mut() {
                        presence.set_recording(true);
                    }
                    preview.set_title("Recording | Space stops");
                }
                (Key::Space, Stage::Recording) => return Ok(true),
                _ => {}
            }
        }
    }
    Ok(false)
}

async fn stop_recording(orchestrator: &mut Orchestrator) -> Result<()> {
    match orchestrator.stop_recording().await {
        Ok(clip) => log::info!("assessment: recorded {} frames", clip.frame_count()),
        Err(AssessError::DataUnavailable(error)) => {
            log::warn!("assessment: {}, retrying", error);
            orchestrator.retry_trim().await?;
        }
        Err(error) => return Err(error.into()),
    }
    Ok(())
}

/// Stop the recording (if one was made), then run `release` to shut down the
/// camera and speech. The clip must not pick up frames from the shutdown.
async fn end_capture(
    orchestrator: &mut Orchestrator,
    recorded: bool,
    release: impl Future<Output = ()>,
) -> Result<()> {
    let stopped = if recorded {
        stop_recording(orchestrator).await
    } else {
        Ok(())
    };
    release.await;
    stopped
}

/// Let the user pick the frame range on the recorded clip.
fn trim(orchestrator: &mut Orchestrator, preview: &mut Preview) -> Result<bool> {
    let clip = orchestrator.clip().context("no clip recorded")?.clone();
    let mut trimmer = Trimmer::new(&clip)?;
    let mut dirty = true;
    while preview.is_open() {
        let selector = orchestrator.selector_mut()?;
        if dirty {
            preview.set_title(&trimmer.title(selector));
            preview.show(&trimmer.render(&clip, selector)?)?;
            dirty = false;
        } else {
            preview.poll();
        }
        for key in preview.keys() {
            match trimmer.handle(key, selector) {
                TrimAction::Continue => dirty = true,
                TrimAction::Confirm => {
                    orchestrator.confirm_range()?;
                    return Ok(true);
                }
                TrimAction::Abort => return Ok(false),
            }
        }
    }
    Ok(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = AssessConfig::load(config_path.as_deref())?;
    match &config.log_dir {
        Some(dir) => init_file_logger(dir)?,
        None => init_stdout_logger(),
    }
    log::info!("service: {}, model: {}", config.service_url, config.model_path.display());

    let services = Arc::new(HttpServices::new(&config.service_url));
    println!("Shoulder assessment");
    let intake = terminal::run_intake(services.as_ref()).await?;
    let initial = intake.result().cloned().context("intake finished without an assessment")?;

    let mut orchestrator = Orchestrator::new(
        RecordingSession::new(config.recording_config()),
        services.clone(),
    )
    .with_retry_policy(config.retry_policy());
    orchestrator.begin(initial, intake.questionnaire_results())?;

    let speaker = Speaker::new(
        HttpSpeechSynth::new(&config.service_url),
        AudioOut::open_pulse(AudioOutConfig::default()),
    );
    let model = match MoveNet::load(&config.model_path) {
        Ok(model) => model,
        Err(error) => log_fatal!("cannot load pose model: {}", error),
    };
    let mut video = match VideoIn::open_v4l2(config.video_config()).await {
        Ok(video) => video,
        Err(error) => log_fatal!("cannot open camera: {}", error),
    };
    let mut frame_loop = FrameLoop::new(PoseEstimator::new(model), FrameCompositor::new(SURFACE_SIZE))
        .with_presence(orchestrator.presence_monitor(config.presence_config())?);
    let mut preview = Preview::open("Shoulder assessment", SURFACE_SIZE)?;

    if let Some(spec) = orchestrator.motion_spec() {
        speaker.say(spec.description.clone());
    }
    let recorded = capture(&mut video, &mut frame_loop, &mut orchestrator, &speaker, &mut preview).await;
    let release = async {
        speaker.silence();
        video.close().await;
    };
    let stopped = end_capture(&mut orchestrator, matches!(recorded, Ok(true)), release).await;
    if !recorded? {
        log::info!("assessment: cancelled before recording finished");
        return Ok(());
    }
    stopped?;
    if let Some(clip) = orchestrator.clip() {
        if let Some(dir) = &config.log_dir {
            clip.save_mjpeg(dir.join("assessment.mjpeg"))?;
        }
    }

    if !trim(&mut orchestrator, &mut preview)? {
        log::info!("assessment: cancelled while trimming");
        return Ok(());
    }
    drop(preview);

    let (outcome, diagnosis) = orchestrator.finish().await?;
    println!("\nMotion assessment:");
    for result in &outcome.results {
        let average = match result.average {
            Some(average) => format!("{:.1}", average),
            None => "no data".to_string(),
        };
        println!(
            "  {} {:?}: {} (expected {}..{}) {}",
            result.spec.kind().name(),
            result.spec.measurement().points(),
            average,
            result.spec.threshold_low(),
            result.spec.threshold_high(),
            if result.within_threshold { "ok" } else { "out of range" }
        );
    }
    println!("  overall: {}", if outcome.overall_success { "pass" } else { "fail" });
    println!("\n{}", diagnosis);
    Ok(())
}
