//! Source providers: looping interleaved PCM pulled one block at a time.

use crate::error::{Result, SoundstageError};

/// Supplies interleaved f32 sample frames on demand.
///
/// Implementations loop internally; running out of material is normal
/// behavior, not an error. `fill` writes up to `out.len()` samples
/// (`frames * channels`, interleaved) and returns the number of frames
/// written; the renderer zero-fills anything short.
///
/// Called from the real-time render callback: implementations must not
/// block, allocate, or perform I/O.
pub trait SourceProvider: Send {
    /// Number of interleaved channels per frame.
    fn channels(&self) -> usize;

    /// Fill `out` with the next interleaved frames, looping as needed.
    /// Returns the number of frames written.
    fn fill(&mut self, out: &mut [f32]) -> usize;
}

/// A looping source over caller-supplied interleaved PCM.
///
/// The read cursor wraps to frame 0 whenever the material is exhausted,
/// including mid-block.
pub struct LoopingPcmSource {
    samples: Vec<f32>,
    channels: usize,
    cursor: usize,
}

impl LoopingPcmSource {
    /// `samples` is interleaved with the given channel count; its length
    /// must be a whole number of frames.
    pub fn new(samples: Vec<f32>, channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(SoundstageError::AudioFormat(
                "channel count must be non-zero".into(),
            ));
        }
        if samples.len() % channels != 0 {
            return Err(SoundstageError::AudioFormat(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            channels,
            cursor: 0,
        })
    }

    pub fn total_frames(&self) -> usize {
        self.samples.len() / self.channels
    }
}

impl SourceProvider for LoopingPcmSource {
    fn channels(&self) -> usize {
        self.channels
    }

    fn fill(&mut self, out: &mut [f32]) -> usize {
        if self.samples.is_empty() {
            return 0;
        }
        let frames = out.len() / self.channels;
        let total = self.samples.len();
        let mut written = 0;
        while written < frames * self.channels {
            let remaining = total - self.cursor;
            let take = remaining.min(frames * self.channels - written);
            out[written..written + take]
                .copy_from_slice(&self.samples[self.cursor..self.cursor + take]);
            self.cursor += take;
            written += take;
            if self.cursor == total {
                self.cursor = 0;
            }
        }
        frames
    }
}

/// The original test signal: a 200 Hz triangle wave played identically on
/// every channel, generated from a one-period wavetable.
pub struct TriangleWaveSource {
    table: Vec<f32>,
    channels: usize,
    phase: usize,
}

impl TriangleWaveSource {
    pub const TONE_HZ: u32 = 200;

    pub fn new(sample_rate: u32, channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(SoundstageError::AudioFormat(
                "channel count must be non-zero".into(),
            ));
        }
        let table_size = (sample_rate / Self::TONE_HZ).max(1) as usize;
        let mut table = Vec::with_capacity(table_size);
        for i in 0..table_size {
            let phase = i as f32 / table_size as f32;
            let amplitude = if phase > 0.5 {
                phase * -4.0 + 3.0
            } else {
                phase * 4.0 - 1.0
            };
            table.push(amplitude);
        }
        Ok(Self {
            table,
            channels,
            phase: 0,
        })
    }
}

impl SourceProvider for TriangleWaveSource {
    fn channels(&self) -> usize {
        self.channels
    }

    fn fill(&mut self, out: &mut [f32]) -> usize {
        let frames = out.len() / self.channels;
        for frame in out.chunks_exact_mut(self.channels) {
            let sample = self.table[self.phase];
            self.phase += 1;
            if self.phase >= self.table.len() {
                self.phase = 0;
            }
            frame.fill(sample);
        }
        frames
    }
}
