//! Audio engine: drives the block renderer from a cpal output stream.

use crate::config::SoundstageDesc;
use crate::error::{Result, SoundstageError};
use crate::events::SoundstageEvent;
use crate::geometry::SharedGeometry;
use crate::render::BlockRenderer;
use crate::source::SourceProvider;
use crate::world::SoundstageWorld;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Everything the callback owns: the renderer with its pre-allocated
/// scratch, and the source it pulls from. Held behind a try-locked mutex so
/// start/stop can reclaim it; the callback never blocks on it.
struct RenderState {
    renderer: BlockRenderer,
    source: Box<dyn SourceProvider>,
}

/// Audio engine that owns the output stream and the render state.
///
/// Construction validates the configuration; a mismatched source or an
/// unsupported layout fails here, never mid-stream.
pub struct SoundstageEngine {
    desc: SoundstageDesc,
    geometry: Arc<SharedGeometry>,
    render_state: Arc<Mutex<RenderState>>,
    stream: Option<cpal::Stream>,
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
    event_sender: Sender<SoundstageEvent>,
    event_receiver: Receiver<SoundstageEvent>,
}

impl SoundstageEngine {
    pub fn new(world: &SoundstageWorld, source: Box<dyn SourceProvider>) -> Result<Self> {
        let desc = world.desc().clone();
        desc.validate()?;
        if source.channels() != desc.channels() {
            return Err(SoundstageError::AudioFormat(format!(
                "source provides {} channels, layout needs {}",
                source.channels(),
                desc.channels()
            )));
        }

        let render_state = Arc::new(Mutex::new(RenderState {
            renderer: BlockRenderer::new(&desc),
            source,
        }));
        let (event_sender, event_receiver) = unbounded();

        Ok(Self {
            desc,
            geometry: world.geometry(),
            render_state,
            stream: None,
            is_running: Arc::new(AtomicBool::new(false)),
            frames_processed: Arc::new(AtomicUsize::new(0)),
            event_sender,
            event_receiver,
        })
    }

    /// Opens the default output device and starts the periodic callback.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running.load(Ordering::Relaxed) {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            SoundstageError::AudioDevice("No default output device available".into())
        })?;
        log::info!(
            "Opening output device {:?} with {} channels at {} Hz",
            device.name().unwrap_or_else(|_| "<unknown>".into()),
            self.desc.channels(),
            self.desc.sample_rate
        );

        let config = cpal::StreamConfig {
            channels: self.desc.channels() as u16,
            sample_rate: cpal::SampleRate(self.desc.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.desc.block_size as u32),
        };

        let default_config = device.default_output_config().map_err(|e| {
            SoundstageError::AudioDevice(format!("Failed to get default config: {}", e))
        })?;

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(&device, &config)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(&device, &config)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(&device, &config)?,
            other => {
                return Err(SoundstageError::AudioFormat(format!(
                    "Unsupported sample format {:?}",
                    other
                )));
            }
        };

        stream
            .play()
            .map_err(|e| SoundstageError::AudioDevice(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        self.is_running.store(true, Ordering::Relaxed);
        let _ = self.event_sender.send(SoundstageEvent::EngineStarted);
        Ok(())
    }

    /// Stops the stream. The callback zero-fills any block raced with the
    /// flag flip, so no torn buffer reaches the device; dropping the stream
    /// then releases it deterministically.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            self.is_running.store(false, Ordering::Relaxed);
            drop(stream);
            let _ = self.event_sender.send(SoundstageEvent::EngineStopped);
            log::info!("Audio engine stopped");
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Frames rendered since the engine was created.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn desc(&self) -> &SoundstageDesc {
        &self.desc
    }

    /// Lifecycle and stream-error events, for the caller to poll.
    pub fn events(&self) -> &Receiver<SoundstageEvent> {
        &self.event_receiver
    }

    fn build_stream<T>(&self, device: &cpal::Device, config: &cpal::StreamConfig) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = self.desc.channels();
        let block_samples = self.desc.block_size * channels;
        let is_running = self.is_running.clone();
        let frames_processed = self.frames_processed.clone();
        let geometry = self.geometry.clone();
        let render_state = self.render_state.clone();
        let error_sender = self.event_sender.clone();

        // The callback's only buffer, allocated here once. Device buffers
        // larger than one block are rendered in block-sized chunks.
        let mut block = vec![0.0f32; block_samples];

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    let Ok(mut state) = render_state.try_lock() else {
                        // Contended only around start/stop; emit silence
                        // rather than block the audio thread.
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    };
                    let state = &mut *state;

                    let mut frames = 0usize;
                    for chunk in data.chunks_mut(block_samples) {
                        let out = &mut block[..chunk.len()];
                        state
                            .renderer
                            .render(state.source.as_mut(), &geometry, out);
                        for (dst, &src) in chunk.iter_mut().zip(out.iter()) {
                            *dst = T::from_sample(src);
                        }
                        frames += chunk.len() / channels;
                    }
                    frames_processed.fetch_add(frames, Ordering::Relaxed);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                    let _ = error_sender.send(SoundstageEvent::StreamError {
                        error: err.to_string(),
                    });
                },
                None,
            )
            .map_err(|e| SoundstageError::AudioDevice(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }
}

impl Drop for SoundstageEngine {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
