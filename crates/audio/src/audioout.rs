use {
    crate::*,
    std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
            mpsc as std_mpsc,
        },
        thread::JoinHandle,
    },
    tokio::sync::mpsc as tokio_mpsc,
};

// number of samples written to the device at once
const CHUNK_SIZE: usize = 256;

// capacity of the audio output status channel
const STATUS_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct AudioOutConfig {
    pub device_name: Option<String>,
    pub sample_rate: usize,
}

impl Default for AudioOutConfig {
    fn default() -> Self {
        Self {
            device_name: None,
            sample_rate: 24000,
        }
    }
}

/// A blocking mono PCM sink, driven from the playback thread.
pub trait AudioOutDevice: Send {
    fn open(&mut self, config: &AudioOutConfig) -> Result<(), AudioError>;
    /// Write samples, blocking until the device accepted them.
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError>;
    /// Block until everything written has been played.
    fn drain(&mut self) -> Result<(), AudioError>;
    fn close(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioOutStatus {
    Started(u64),
    Finished { id: u64, index: usize },
    Canceled { id: u64, index: usize },
    Failed(u64),
}

struct AudioOutChunk {
    id: u64,
    sample: AudioSample,
}

pub struct AudioOut {
    output_tx: Option<std_mpsc::Sender<AudioOutChunk>>,
    cancel: Arc<AtomicBool>,
    status_rx: tokio_mpsc::Receiver<AudioOutStatus>,
    next_id: u64,
    join_handle: Option<JoinHandle<()>>,
}

fn report(status_tx: &tokio_mpsc::Sender<AudioOutStatus>, status: AudioOutStatus) {
    // nobody has to listen; a full channel drops the status
    if let Err(error) = status_tx.try_send(status) {
        log::debug!("audio status dropped: {}", error);
    }
}

fn run_worker(
    mut device: Box<dyn AudioOutDevice>,
    mut config: AudioOutConfig,
    output_rx: std_mpsc::Receiver<AudioOutChunk>,
    status_tx: tokio_mpsc::Sender<AudioOutStatus>,
    cancel: Arc<AtomicBool>,
) {
    let mut open = false;
    while let Ok(chunk) = output_rx.recv() {
        if cancel.swap(false, Ordering::Relaxed) {
            report(&status_tx, AudioOutStatus::Canceled { id: chunk.id, index: 0 });
            while let Ok(chunk) = output_rx.try_recv() {
                report(&status_tx, AudioOutStatus::Canceled { id: chunk.id, index: 0 });
            }
            continue;
        }

        // the device follows the sample rate of whatever is being played
        if open && chunk.sample.sample_rate != config.sample_rate {
            device.close();
            open = false;
        }
        if !open {
            config.sample_rate = chunk.sample.sample_rate;
            if let Err(error) = device.open(&config) {
                log::warn!("audio out: failed to open device: {}", error);
                report(&status_tx, AudioOutStatus::Failed(chunk.id));
                continue;
            }
            open = true;
        }

        report(&status_tx, AudioOutStatus::Started(chunk.id));
        let samples = chunk.sample.samples();
        let mut index = 0;
        let mut canceled = false;
        while index < samples.len() {
            if cancel.swap(false, Ordering::Relaxed) {
                canceled = true;
                break;
            }
            let end = (index + CHUNK_SIZE).min(samples.len());
            if let Err(error) = device.write(&samples[index..end]) {
                log::warn!("audio out: write failed: {}", error);
                device.close();
                open = false;
                break;
            }
            index = end;
        }

        if canceled {
            report(&status_tx, AudioOutStatus::Canceled { id: chunk.id, index });
        } else if index < samples.len() {
            report(&status_tx, AudioOutStatus::Failed(chunk.id));
        } else {
            if let Err(error) = device.drain() {
                log::warn!("audio out: drain failed: {}", error);
            }
            report(&status_tx, AudioOutStatus::Finished { id: chunk.id, index });
        }
    }
    if open {
        device.close();
    }
}

impl AudioOut {
    /// Start a playback thread on `device`. The device is opened lazily, at the
    /// sample rate of the first sample played.
    pub fn open(device: Box<dyn AudioOutDevice>, config: AudioOutConfig) -> Self {
        let (output_tx, output_rx) = std_mpsc::channel::<AudioOutChunk>();
        let (status_tx, status_rx) = tokio_mpsc::channel(STATUS_CHANNEL_CAPACITY);
        let cancel = Arc::new(AtomicBool::new(false));
        let join_handle = std::thread::spawn({
            let cancel = Arc::clone(&cancel);
            move || run_worker(device, config, output_rx, status_tx, cancel)
        });
        Self {
            output_tx: Some(output_tx),
            cancel,
            status_rx,
            next_id: 0,
            join_handle: Some(join_handle),
        }
    }

    #[cfg(feature = "pulse")]
    pub fn open_pulse(config: AudioOutConfig) -> Self {
        Self::open(Box::new(PulseOut::new()), config)
    }

    /// Queue a sample for playback and return its id.
    pub fn play(&mut self, sample: AudioSample) -> Result<u64, AudioError> {
        let id = self.next_id;
        self.next_id += 1;
        self.output_tx
            .as_ref()
            .ok_or(AudioError::Closed)?
            .send(AudioOutChunk { id, sample })
            .map_err(|_| AudioError::Closed)?;
        Ok(id)
    }

    /// Stop the current sample and discard queued ones.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub async fn recv(&mut self) -> Option<AudioOutStatus> {
        self.status_rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<AudioOutStatus> {
        self.status_rx.try_recv().ok()
    }
}

impl Drop for AudioOut {
    fn drop(&mut self) {
        // closing the queue ends the worker once it finishes the current sample
        self.cancel.store(true, Ordering::Relaxed);
        self.output_tx.take();
        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                log::error!("audio out: worker panicked");
            }
        }
    }
}
