//! # Audio Capture Module
//!
//! Microphone input via CPAL. The stream callback forwards raw sample chunks
//! over a channel; [`CpalSource::capture_block`] assembles them into
//! fixed-length mono blocks for the sampling loop. The [`AudioSource`] trait
//! is the seam between the loop and the device, so tests drive the loop with
//! scripted sources instead of hardware.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Errors raised while opening or reading the audio input.
///
/// None of these are retried: a failed acquisition ends the current run and
/// is reported through the session's observers.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No audio input device is available on the host.
    #[error("no audio input device available")]
    NoInputDevice,

    /// The device offers no mono f32 configuration near the requested rate.
    #[error("no suitable mono f32 input format at {0} Hz")]
    UnsupportedFormat(u32),

    /// Querying the device name failed.
    #[error("failed to query device name: {0}")]
    DeviceName(#[from] cpal::DeviceNameError),

    /// Enumerating supported stream configurations failed.
    #[error("failed to enumerate input configurations: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    /// Building the input stream failed.
    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Starting the input stream failed.
    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The stream stopped delivering data.
    #[error("audio stream produced no data for {0:?}")]
    Stalled(Duration),

    /// The stream callback side of the channel was dropped.
    #[error("audio stream closed unexpectedly")]
    StreamClosed,
}

/// A blocking producer of fixed-length mono audio blocks.
///
/// `capture_block` returns exactly one full block or an error; there is no
/// partial-block result. Implementations are constructed on the thread that
/// consumes them (CPAL streams are not `Send`).
pub trait AudioSource {
    /// Sample rate of the delivered blocks, in Hz. A device may not support
    /// the requested rate exactly; downstream analysis must use this value,
    /// not the request.
    fn sample_rate(&self) -> u32;

    /// Blocks until one full audio block has been captured.
    fn capture_block(&mut self) -> Result<Vec<f32>, CaptureError>;
}

/// Microphone-backed [`AudioSource`] using the default CPAL input device.
pub struct CpalSource {
    // Held for its side effect: dropping the stream stops capture.
    _stream: cpal::Stream,
    receiver: Receiver<Vec<f32>>,
    pending: Vec<f32>,
    sample_rate: u32,
    block_len: usize,
    stall_timeout: Duration,
}

impl CpalSource {
    /// Opens the default input device with a mono f32 stream as close to
    /// `sample_rate` as the device supports.
    ///
    /// The selected rate may differ from the request when the device does
    /// not support it; [`AudioSource::sample_rate`] reports the rate the
    /// stream actually runs at, and the block length is derived from that
    /// rate so a block always covers `block_duration` of audio.
    ///
    /// # Arguments
    /// * `sample_rate` - Requested capture rate in Hz
    /// * `block_duration` - Duration of audio one block must cover
    ///
    /// # Returns
    /// * `Ok(source)` - Capturing source; the stream is already playing
    /// * `Err(e)` - No device, no mono f32 format, or a stream error
    pub fn open(
        sample_rate: u32,
        block_duration: Duration,
    ) -> Result<CpalSource, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        info!(device = %device.name()?, "opening audio input");

        let configs = device.supported_input_configs()?.collect::<Vec<_>>();
        let range = find_supported_config(configs, sample_rate)
            .ok_or(CaptureError::UnsupportedFormat(sample_rate))?;

        // Clamp into the supported range rather than trusting the request.
        let rate = sample_rate
            .clamp(range.min_sample_rate().0, range.max_sample_rate().0);
        let config: cpal::StreamConfig =
            range.with_sample_rate(cpal::SampleRate(rate)).into();

        info!(sample_rate = rate, "selected input sample rate");

        // The block must cover the configured duration at the rate the
        // stream actually runs at.
        let block_len = (rate as f64 * block_duration.as_secs_f64()).round() as usize;

        // Bounded so a stalled consumer sheds audio instead of growing the
        // queue without limit; capture_block discards stale chunks anyway.
        let (sender, receiver) = bounded::<Vec<f32>>(32);

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = sender.try_send(data.to_vec());
            },
            |err| error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;

        Ok(CpalSource {
            _stream: stream,
            receiver,
            pending: Vec::with_capacity(block_len * 2),
            sample_rate: rate,
            block_len,
            stall_timeout: Duration::from_secs(2),
        })
    }
}

impl AudioSource for CpalSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn capture_block(&mut self) -> Result<Vec<f32>, CaptureError> {
        // Audio recorded between calls is stale by the time the next block
        // is requested (the loop sleeps between iterations); drop it and
        // record a fresh block, matching on-demand capture semantics.
        self.pending.clear();
        while self.receiver.try_recv().is_ok() {}

        while self.pending.len() < self.block_len {
            match self.receiver.recv_timeout(self.stall_timeout) {
                Ok(chunk) => self.pending.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(CaptureError::Stalled(self.stall_timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CaptureError::StreamClosed);
                }
            }
        }

        let mut block = std::mem::take(&mut self.pending);
        block.truncate(self.block_len);
        Ok(block)
    }
}

/// Finds the supported configuration range best matching the target rate,
/// restricted to mono f32 formats.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i64 - target_rate as i64).abs();
            let max_diff = (c.max_sample_rate().0 as i64 - target_rate as i64).abs();
            min_diff.min(max_diff)
        })
}
