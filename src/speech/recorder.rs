use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result, bail};
use cpal::SampleFormat;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::{WavSpec, WavWriter};
use log::{error, info};

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);
const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Mono samples captured from the default input device.
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Microphone capture on a background worker with a cooperative stop flag.
/// The cpal stream lives entirely on the worker thread.
pub struct Recorder {
    stop_flag: Arc<AtomicBool>,
    samples: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
    worker: Option<JoinHandle<()>>,
}

impl Recorder {
    pub fn start() -> Result<Self> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let samples = Arc::new(Mutex::new(Vec::new()));
        let (setup_tx, setup_rx) = mpsc::channel();

        let stop = stop_flag.clone();
        let sink = samples.clone();
        let worker = thread::spawn(move || run_input_stream(&stop, &sink, &setup_tx));

        // The worker reports back once the stream is playing, so device
        // problems surface here instead of as a silent recording.
        let sample_rate = setup_rx
            .recv()
            .context("recording worker exited before reporting its stream setup")??;
        info!("recording started at {sample_rate} Hz");

        Ok(Self {
            stop_flag,
            samples,
            sample_rate,
            worker: Some(worker),
        })
    }

    pub fn stop(mut self) -> Result<Recording> {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let deadline = Instant::now() + WORKER_JOIN_TIMEOUT;
            while !worker.is_finished() && Instant::now() < deadline {
                thread::sleep(STOP_POLL_INTERVAL);
            }
            if worker.is_finished() {
                let _ = worker.join();
            } else {
                error!("recording worker did not stop within {WORKER_JOIN_TIMEOUT:?}, abandoning it");
            }
        }

        let samples = {
            let mut buffer = self.samples.lock().unwrap_or_else(|err| err.into_inner());
            std::mem::take(&mut *buffer)
        };
        info!(
            "recording stopped, {} samples ({:.1}s)",
            samples.len(),
            samples.len() as f32 / self.sample_rate as f32
        );
        Ok(Recording {
            samples,
            sample_rate: self.sample_rate,
        })
    }
}

fn run_input_stream(
    stop: &Arc<AtomicBool>,
    sink: &Arc<Mutex<Vec<f32>>>,
    setup_tx: &mpsc::Sender<Result<u32>>,
) {
    match build_stream(sink) {
        Ok((stream, sample_rate)) => {
            let _ = setup_tx.send(Ok(sample_rate));
            while !stop.load(Ordering::Relaxed) {
                thread::sleep(STOP_POLL_INTERVAL);
            }
            drop(stream);
        }
        Err(err) => {
            let _ = setup_tx.send(Err(err));
        }
    }
}

fn build_stream(sink: &Arc<Mutex<Vec<f32>>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("no audio input device available")?;
    let supported = device
        .default_input_config()
        .context("no default input config")?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    let channels = config.channels as usize;
    let sample_rate = config.sample_rate.0;

    let stream = match sample_format {
        SampleFormat::F32 => {
            let sink = sink.clone();
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_mono(&sink, data.iter().copied(), channels);
                },
                log_stream_error,
                None,
            )?
        }
        SampleFormat::I16 => {
            let sink = sink.clone();
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    push_mono(
                        &sink,
                        data.iter().map(|s| f32::from(*s) / f32::from(i16::MAX)),
                        channels,
                    );
                },
                log_stream_error,
                None,
            )?
        }
        other => bail!("unsupported input sample format {other:?}"),
    };
    stream.play()?;
    Ok((stream, sample_rate))
}

fn log_stream_error(err: cpal::StreamError) {
    error!("audio stream error: {err}");
}

// Keep the first channel only.
fn push_mono(
    sink: &Arc<Mutex<Vec<f32>>>,
    data: impl Iterator<Item = f32>,
    channels: usize,
) {
    let mut buffer = sink.lock().unwrap_or_else(|err| err.into_inner());
    buffer.extend(data.step_by(channels.max(1)));
}

/// Writes a recording as 16-bit mono PCM.
pub fn write_wav(path: &Path, recording: &Recording) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: recording.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for sample in &recording.samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wav_output_is_mono_16_bit() {
        let recording = Recording {
            samples: vec![0.0, 0.5, -0.5, 1.5, -1.5],
            sample_rate: 16_000,
        };
        let path =
            std::env::temp_dir().join(format!("readscreen-test-{}.wav", std::process::id()));
        write_wav(&path, &recording).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.into_samples().map(Result::unwrap).collect();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(samples.len(), 5);
        // Out-of-range input is clamped, not wrapped.
        assert_eq!(samples[3], i16::MAX);
        assert_eq!(samples[4], -i16::MAX);
    }

    #[test]
    fn push_mono_downmixes_interleaved_stereo() {
        let sink = Arc::new(Mutex::new(Vec::new()));
        push_mono(&sink, [0.1f32, 0.9, 0.2, 0.8, 0.3, 0.7].into_iter(), 2);
        assert_eq!(*sink.lock().unwrap(), vec![0.1, 0.2, 0.3]);
    }
}
