use {
    base::Vec2,
    image::{Image, PixelFormat},
    std::{
        collections::VecDeque,
        sync::{
            Arc,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        time::Duration,
    },
    video::{VideoError, VideoIn, VideoInConfig, VideoInDevice},
};

#[derive(Clone, Default)]
struct Probe {
    opens: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

/// Produces the scripted frames, then fails; reopening fails too.
struct ScriptedDevice {
    frames: VecDeque<u8>,
    endless: bool,
    fail_open: bool,
    probe: Probe,
}

impl ScriptedDevice {
    fn new(frames: impl IntoIterator<Item = u8>, probe: &Probe) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            endless: false,
            fail_open: false,
            probe: probe.clone(),
        }
    }
}

impl VideoInDevice for ScriptedDevice {
    fn open(&mut self, config: &VideoInConfig) -> Result<VideoInConfig, VideoError> {
        let first = self.probe.opens.fetch_add(1, Ordering::SeqCst) == 0;
        if self.fail_open || !first {
            return Err(VideoError::Device("no camera".to_string()));
        }
        Ok(config
            .clone()
            .with_size(2, 1)
            .with_format(PixelFormat::Rgb8)
            .with_frame_rate(30.0))
    }

    fn close(&mut self) {
        self.probe.closed.store(true, Ordering::SeqCst);
    }

    fn blocking_capture(&mut self) -> Result<Image, VideoError> {
        let value = match self.frames.pop_front() {
            Some(value) => value,
            None if self.endless => {
                std::thread::sleep(Duration::from_millis(1));
                0
            }
            None => return Err(VideoError::Stream("unplugged".to_string())),
        };
        Ok(Image::new(Vec2::new(2, 1), vec![value; 6], PixelFormat::Rgb8))
    }
}

async fn wait_closed(probe: &Probe) {
    for _ in 0..500 {
        if probe.closed.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("device was never closed");
}

#[tokio::test]
async fn test_open_reports_resolved_config() {
    let probe = Probe::default();
    let videoin = VideoIn::open(
        Box::new(ScriptedDevice::new([1], &probe)),
        VideoInConfig::default().with_size(640, 480),
    )
    .await
    .unwrap();
    assert_eq!(videoin.size(), Some(Vec2::new(2, 1)));
    assert_eq!(videoin.frame_rate(), Some(30.0));
    assert_eq!(videoin.config().format, Some(PixelFormat::Rgb8));
}

#[tokio::test]
async fn test_open_failure_is_reported() {
    let probe = Probe::default();
    let mut device = ScriptedDevice::new([], &probe);
    device.fail_open = true;
    let result = VideoIn::open(Box::new(device), VideoInConfig::default()).await;
    assert!(matches!(result, Err(VideoError::Device(_))));
}

#[tokio::test]
async fn test_frames_arrive_in_order_then_close() {
    let probe = Probe::default();
    let mut videoin = VideoIn::open(
        Box::new(ScriptedDevice::new([10, 20], &probe)),
        VideoInConfig::default(),
    )
    .await
    .unwrap();

    let first = videoin.capture().await.unwrap();
    let second = videoin.capture().await.unwrap();
    assert_eq!(first.image.data[0], 10);
    assert_eq!(first.sequence, 0);
    assert_eq!(second.image.data[0], 20);
    assert!(second.captured_at >= first.captured_at);

    // capture fails, reopen fails, worker shuts down
    assert!(matches!(videoin.capture().await, Err(VideoError::Closed)));
    assert!(probe.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_latest_skips_stale_frames() {
    let probe = Probe::default();
    let mut videoin = VideoIn::open(
        Box::new(ScriptedDevice::new([1, 2, 3], &probe)),
        VideoInConfig::default(),
    )
    .await
    .unwrap();
    wait_closed(&probe).await;

    let frame = videoin.latest().await.unwrap();
    assert_eq!(frame.image.data[0], 3);
    assert_eq!(frame.sequence, 2);
}

#[tokio::test]
async fn test_drop_releases_device() {
    let probe = Probe::default();
    let mut device = ScriptedDevice::new([], &probe);
    device.endless = true;
    let mut videoin = VideoIn::open(Box::new(device), VideoInConfig::default())
        .await
        .unwrap();
    videoin.capture().await.unwrap();
    drop(videoin);
    wait_closed(&probe).await;
}

#[tokio::test]
async fn test_close_waits_for_worker() {
    let probe = Probe::default();
    let mut device = ScriptedDevice::new([], &probe);
    device.endless = true;
    let videoin = VideoIn::open(Box::new(device), VideoInConfig::default())
        .await
        .unwrap();
    videoin.close().await;
    assert!(probe.closed.load(Ordering::SeqCst));
}

#[test]
fn test_to_rgb_decodes_yuyv() {
    let frame = video::VideoFrame {
        image: Image::new(Vec2::new(2, 1), vec![128; 4], PixelFormat::Yuyv),
        captured_at: std::time::Instant::now(),
        sequence: 0,
    };
    assert_eq!(frame.to_rgb().unwrap().data, vec![128; 6]);
}
