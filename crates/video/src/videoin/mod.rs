use {
    crate::*,
    base::Vec2,
    image::{Image, PixelFormat},
    std::{
        path::PathBuf,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::{Duration, Instant},
    },
    tokio::{
        sync::{mpsc, oneshot},
        task::{JoinHandle, spawn_blocking},
    },
};

#[cfg(feature = "v4l2")]
mod v4l2;
#[cfg(feature = "v4l2")]
pub use v4l2::V4l2;

// capacity of the video input channel
const CHANNEL_CAPACITY: usize = 4;

// delay before reopening after a capture failure
const WAIT_BEFORE_REOPEN_MS: u64 = 100;

// reopen attempts before the worker gives up on the device
const MAX_REOPEN_ATTEMPTS: usize = 3;

/// Requested capture parameters. `None` keeps whatever the device offers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInConfig {
    pub path: Option<PathBuf>,
    pub size: Option<Vec2<usize>>,
    pub format: Option<PixelFormat>,
    pub frame_rate: Option<f32>,
}

impl VideoInConfig {
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.size = Some(Vec2::new(width, height));
        self
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }
}

/// A capture device driven from the worker thread.
///
/// `open` and `blocking_capture` are always called from the same OS thread.
pub trait VideoInDevice: Send {
    /// Open the device and return the configuration that was actually applied.
    fn open(&mut self, config: &VideoInConfig) -> Result<VideoInConfig, VideoError>;
    /// Close the device, if open.
    fn close(&mut self);
    /// Block until the next frame is available.
    fn blocking_capture(&mut self) -> Result<Image, VideoError>;
}

pub struct VideoIn {
    receiver: mpsc::Receiver<VideoFrame>,
    cancel: Arc<AtomicBool>,
    config: VideoInConfig,
    join_handle: Option<JoinHandle<()>>,
}

fn reopen(device: &mut dyn VideoInDevice, config: &mut VideoInConfig, cancel: &AtomicBool) -> bool {
    for attempt in 1..=MAX_REOPEN_ATTEMPTS {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        log::info!("video worker: reopening device (attempt {})", attempt);
        device.close();
        std::thread::sleep(Duration::from_millis(WAIT_BEFORE_REOPEN_MS));
        match device.open(config) {
            Ok(new_config) => {
                *config = new_config;
                return true;
            }
            Err(error) => log::warn!("video worker: reopen failed: {}", error),
        }
    }
    false
}

fn run_worker(
    mut device: Box<dyn VideoInDevice>,
    config: VideoInConfig,
    sender: mpsc::Sender<VideoFrame>,
    cancel: Arc<AtomicBool>,
    init_tx: oneshot::Sender<Result<VideoInConfig, VideoError>>,
) {
    let mut config = match device.open(&config) {
        Ok(config) => {
            let _ = init_tx.send(Ok(config.clone()));
            config
        }
        Err(error) => {
            let _ = init_tx.send(Err(error));
            return;
        }
    };

    let mut sequence = 0u64;
    'outer: while !cancel.load(Ordering::Relaxed) {
        match device.blocking_capture() {
            Ok(image) => {
                let frame = VideoFrame {
                    image,
                    captured_at: Instant::now(),
                    sequence,
                };
                sequence += 1;
                if sender.blocking_send(frame).is_err() {
                    // receiver dropped
                    break 'outer;
                }
            }
            Err(error) => {
                log::error!("video worker: capture failed: {}", error);
                if !reopen(device.as_mut(), &mut config, &cancel) {
                    log::error!("video worker: giving up on device");
                    break 'outer;
                }
            }
        }
    }
    device.close();
    log::debug!("video worker: stopped after {} frames", sequence);
}

impl VideoIn {
    /// Open `device` on a fresh worker thread. Fails if the device cannot be opened.
    pub async fn open(
        device: Box<dyn VideoInDevice>,
        config: VideoInConfig,
    ) -> Result<Self, VideoError> {
        let (sender, receiver) = mpsc::channel::<VideoFrame>(CHANNEL_CAPACITY);
        let cancel = Arc::new(AtomicBool::new(false));
        let (init_tx, init_rx) = oneshot::channel();

        let join_handle = spawn_blocking({
            let cancel = Arc::clone(&cancel);
            move || run_worker(device, config, sender, cancel, init_tx)
        });

        let config = init_rx
            .await
            .map_err(|_| VideoError::Device("worker thread died during init".to_string()))??;
        log::info!(
            "video: opened {:?} {:?} @ {:?} fps",
            config.size,
            config.format,
            config.frame_rate
        );

        Ok(Self {
            receiver,
            cancel,
            config,
            join_handle: Some(join_handle),
        })
    }

    /// Open the default V4L2 camera, or the one at `config.path`.
    #[cfg(feature = "v4l2")]
    pub async fn open_v4l2(config: VideoInConfig) -> Result<Self, VideoError> {
        Self::open(Box::new(V4l2::new()), config).await
    }

    /// The configuration the device accepted.
    pub fn config(&self) -> &VideoInConfig {
        &self.config
    }

    pub fn size(&self) -> Option<Vec2<usize>> {
        self.config.size
    }

    pub fn frame_rate(&self) -> Option<f32> {
        self.config.frame_rate
    }

    /// Wait for the next frame in capture order.
    pub async fn capture(&mut self) -> Result<VideoFrame, VideoError> {
        self.receiver.recv().await.ok_or(VideoError::Closed)
    }

    /// Wait for a frame, then skip any that queued up behind it and return the newest.
    pub async fn latest(&mut self) -> Result<VideoFrame, VideoError> {
        let mut frame = self.capture().await?;
        let mut skipped = 0;
        while let Ok(newer) = self.receiver.try_recv() {
            frame = newer;
            skipped += 1;
        }
        if skipped > 0 {
            log::debug!("video: skipped {} stale frames", skipped);
        }
        Ok(frame)
    }

    /// Stop the worker and wait until the device is closed.
    pub async fn close(mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        // unblock a worker waiting on a full channel
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
        if let Some(join_handle) = self.join_handle.take() {
            if let Err(error) = join_handle.await {
                log::error!("video worker panicked: {}", error);
            }
        }
    }
}

impl Drop for VideoIn {
    fn drop(&mut self) {
        // the worker observes the flag (or the dropped receiver) and closes the device
        self.cancel.store(true, Ordering::Relaxed);
        self.receiver.close();
    }
}
