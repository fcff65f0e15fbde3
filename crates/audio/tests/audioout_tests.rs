use {
    audio::{AudioError, AudioOut, AudioOutConfig, AudioOutDevice, AudioOutStatus, AudioSample},
    std::sync::{Arc, Mutex},
};

#[derive(Default)]
struct Log {
    opened_at: Vec<usize>,
    written: Vec<i16>,
    closes: usize,
}

struct MemoryDevice {
    log: Arc<Mutex<Log>>,
    fail_open: bool,
}

impl AudioOutDevice for MemoryDevice {
    fn open(&mut self, config: &AudioOutConfig) -> Result<(), AudioError> {
        if self.fail_open {
            return Err(AudioError::Device("no sink".to_string()));
        }
        self.log.lock().unwrap().opened_at.push(config.sample_rate);
        Ok(())
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        self.log.lock().unwrap().written.extend_from_slice(samples);
        Ok(())
    }

    fn drain(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn close(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }
}

fn memory_out(fail_open: bool) -> (AudioOut, Arc<Mutex<Log>>) {
    let log = Arc::new(Mutex::new(Log::default()));
    let device = MemoryDevice {
        log: Arc::clone(&log),
        fail_open,
    };
    (AudioOut::open(Box::new(device), AudioOutConfig::default()), log)
}

#[tokio::test]
async fn test_play_writes_every_sample() {
    let (mut out, log) = memory_out(false);
    let samples: Vec<i16> = (0..1000).map(|i| i as i16).collect();
    let id = out.play(AudioSample::new(samples.clone(), 16000)).unwrap();

    assert_eq!(out.recv().await, Some(AudioOutStatus::Started(id)));
    assert_eq!(
        out.recv().await,
        Some(AudioOutStatus::Finished { id, index: 1000 })
    );
    let log = log.lock().unwrap();
    assert_eq!(log.written, samples);
    assert_eq!(log.opened_at, vec![16000]);
}

#[tokio::test]
async fn test_sample_rate_change_reopens() {
    let (mut out, log) = memory_out(false);
    let first = out.play(AudioSample::new(vec![1; 10], 16000)).unwrap();
    let second = out.play(AudioSample::new(vec![2; 10], 24000)).unwrap();
    assert_ne!(first, second);
    while let Some(status) = out.recv().await {
        if status == (AudioOutStatus::Finished { id: second, index: 10 }) {
            break;
        }
    }
    let log = log.lock().unwrap();
    assert_eq!(log.opened_at, vec![16000, 24000]);
    assert_eq!(log.closes, 1);
}

#[tokio::test]
async fn test_open_failure_is_reported() {
    let (mut out, _log) = memory_out(true);
    let id = out.play(AudioSample::new(vec![0; 4], 16000)).unwrap();
    assert_eq!(out.recv().await, Some(AudioOutStatus::Failed(id)));
}

#[test]
fn test_drop_closes_device() {
    let (mut out, log) = memory_out(false);
    out.play(AudioSample::new(vec![0; 4], 16000)).unwrap();
    drop(out);
    // the queued sample is either played or canceled, and the device is released
    let log = log.lock().unwrap();
    assert_eq!(log.closes, log.opened_at.len());
}
