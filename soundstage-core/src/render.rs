//! Per-block renderer: the body of the real-time audio callback.
//!
//! One call produces one output block: pull interleaved frames from the
//! source, demultiplex, apply the rotation mixer and distance gains, pass
//! the subwoofer straight through, reinterleave. Every buffer it touches is
//! allocated at construction and reused; the callback path never allocates,
//! locks, or performs I/O.

use crate::config::SoundstageDesc;
use crate::geometry::{GeometrySnapshot, SharedGeometry};
use crate::source::SourceProvider;
use crate::spatial::RotationMixer;
use crate::spatial::gain::{normalized_gain, speaker_distances};

pub struct BlockRenderer {
    channels: usize,
    block_size: usize,
    subwoofer: Option<usize>,
    reference_distance: f32,
    mixer: RotationMixer,
    snap: GeometrySnapshot,
    /// Interleaved pull buffer, `block_size * N`.
    pull: Vec<f32>,
    /// Per-channel input planes, N × `block_size`.
    planar_in: Vec<Vec<f32>>,
    /// Per-channel output planes, N × `block_size`.
    planar_out: Vec<Vec<f32>>,
    distances: Vec<f32>,
    gains: Vec<f32>,
}

impl BlockRenderer {
    pub fn new(desc: &SoundstageDesc) -> Self {
        let channels = desc.channels();
        let block_size = desc.block_size;
        Self {
            channels,
            block_size,
            subwoofer: desc.layout.subwoofer_index(),
            reference_distance: desc.reference_distance,
            mixer: RotationMixer::new(&desc.layout, desc.rotation_spread),
            snap: GeometrySnapshot::new(channels),
            pull: vec![0.0; block_size * channels],
            planar_in: vec![vec![0.0; block_size]; channels],
            planar_out: vec![vec![0.0; block_size]; channels],
            distances: vec![0.0; channels],
            gains: vec![0.0; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Renders one block of `out.len() / N` frames (at most the configured
    /// block size) into the interleaved output slice.
    pub fn render(
        &mut self,
        source: &mut dyn SourceProvider,
        shared: &SharedGeometry,
        out: &mut [f32],
    ) {
        let n = self.channels;
        let frames = (out.len() / n).min(self.block_size);
        let samples = frames * n;

        // One consistent geometry view for the whole block.
        shared.load_into(&mut self.snap);
        self.mixer.rebuild(&self.snap);

        speaker_distances(self.snap.listener, &self.snap.speakers, &mut self.distances);
        for (gain, &d) in self.gains.iter_mut().zip(&self.distances) {
            *gain = normalized_gain(d, self.snap.max_gain, self.reference_distance);
        }
        if let Some(sub) = self.subwoofer {
            // Passthrough channel: unattenuated, and shown as such.
            self.gains[sub] = 1.0;
        }

        // Pull the next frames; anything the source leaves short stays
        // silent rather than becoming an error.
        let pull = &mut self.pull[..samples];
        pull.fill(0.0);
        source.fill(pull);

        // Demultiplex into per-channel planes.
        for (c, plane) in self.planar_in.iter_mut().enumerate() {
            for (i, sample) in plane[..frames].iter_mut().enumerate() {
                *sample = pull[i * n + c];
            }
        }

        for plane in &mut self.planar_out {
            plane[..frames].fill(0.0);
        }

        // Linear superposition: each virtual channel spreads over every
        // directional speaker, scaled by that speaker's distance gain.
        let order = self.mixer.angular_order();
        for (v, &src) in order.iter().enumerate() {
            for (col, &dst) in order.iter().enumerate() {
                let weight = self.mixer.weight(v, col) * self.gains[dst];
                if weight == 0.0 {
                    continue;
                }
                let input = &self.planar_in[src][..frames];
                let output = &mut self.planar_out[dst][..frames];
                for (o, &i) in output.iter_mut().zip(input) {
                    *o += i * weight;
                }
            }
        }

        if let Some(sub) = self.subwoofer {
            let (input, output) = (&self.planar_in[sub], &mut self.planar_out[sub]);
            output[..frames].copy_from_slice(&input[..frames]);
        }

        // Reinterleave into the output block.
        for (c, plane) in self.planar_out.iter().enumerate() {
            for (i, &sample) in plane[..frames].iter().enumerate() {
                out[i * n + c] = sample;
            }
        }

        // Observability snapshot; never read back by the engine.
        for (c, &gain) in self.gains.iter().enumerate() {
            shared.store_channel_gain(c, gain);
        }
    }
}
