//! In-process board that needs no hardware.
//!
//! Produces the [`CYTON`](super::layout::CYTON) row layout at 250 Hz: a
//! distinct sine per EXG channel, a constant 1 g on the accelerometer Z axis,
//! wall-clock timestamps, and inserted markers queued onto the following
//! samples, one marker per sample.
//!
//! Samples are derived from elapsed [`tokio::time::Instant`] time, so a
//! paused tokio clock makes the sample count exact.

use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::Array2;
use tokio::time::Instant;

use super::layout::{CYTON, ChannelLayout};
use super::{BoardSession, SYNTHETIC_BOARD_ID};
use crate::error::{ProtocolError, ProtocolResult};

/// Sampling rate of the synthetic board, in Hz.
pub const SAMPLING_RATE_HZ: u32 = 250;

const EXG_AMPLITUDE_UV: f64 = 10.0;

struct Stream {
    started_at: Instant,
    started_unix: f64,
    /// Samples generated since `started_at`.
    emitted: u64,
    ring_buffer_size: usize,
}

/// Deterministic stand-in for a real board (id `-1`).
pub struct SyntheticBoard {
    layout: ChannelLayout,
    prepared: bool,
    stream: Option<Stream>,
    buffer: VecDeque<Vec<f64>>,
    pending_markers: VecDeque<f64>,
    package_num: u64,
}

impl SyntheticBoard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            layout: CYTON,
            prepared: false,
            stream: None,
            buffer: VecDeque::new(),
            pending_markers: VecDeque::new(),
            package_num: 0,
        }
    }

    #[must_use]
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Samples currently held in the ring buffer.
    #[must_use]
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Generate every sample due since the last call.
    fn advance(&mut self) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        let elapsed = stream.started_at.elapsed();
        let due = elapsed.as_secs() * u64::from(SAMPLING_RATE_HZ)
            + u64::from(elapsed.subsec_nanos()) * u64::from(SAMPLING_RATE_HZ) / 1_000_000_000;

        while stream.emitted < due {
            #[allow(clippy::cast_precision_loss)]
            let t = stream.emitted as f64 / f64::from(SAMPLING_RATE_HZ);
            let mut sample = vec![0.0; self.layout.num_rows()];

            #[allow(clippy::cast_precision_loss)]
            {
                sample[self.layout.package_num] = (self.package_num % 256) as f64;
            }
            for (i, &row) in self.layout.exg.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let freq = 2.0 * (i as f64 + 1.0);
                sample[row] = EXG_AMPLITUDE_UV * (TAU * freq * t).sin();
            }
            if let Some(&z) = self.layout.accel.last() {
                sample[z] = 1.0;
            }
            sample[self.layout.timestamp] = stream.started_unix + t;
            if let Some(value) = self.pending_markers.pop_front() {
                sample[self.layout.marker] = value;
            }

            if self.buffer.len() == stream.ring_buffer_size {
                self.buffer.pop_front();
            }
            self.buffer.push_back(sample);
            stream.emitted += 1;
            self.package_num += 1;
        }
    }

    fn not_prepared(operation: &str) -> ProtocolError {
        ProtocolError::StreamFailed {
            reason: format!("synthetic board: cannot {operation}, session is not prepared"),
        }
    }
}

impl Default for SyntheticBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardSession for SyntheticBoard {
    fn board_id(&self) -> i32 {
        SYNTHETIC_BOARD_ID
    }

    fn prepare_session(&mut self) -> ProtocolResult<()> {
        self.prepared = true;
        Ok(())
    }

    fn start_stream(
        &mut self,
        ring_buffer_size: usize,
        streamer_params: &str,
    ) -> ProtocolResult<()> {
        if !self.prepared {
            return Err(Self::not_prepared("start stream"));
        }
        if self.stream.is_some() {
            return Err(ProtocolError::StreamFailed {
                reason: "synthetic board: stream already running".into(),
            });
        }
        if ring_buffer_size == 0 {
            return Err(ProtocolError::StreamFailed {
                reason: "synthetic board: ring buffer size must be positive".into(),
            });
        }
        if !streamer_params.is_empty() {
            tracing::debug!(streamer_params, "Synthetic board ignores streamer params");
        }
        let started_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        self.stream = Some(Stream {
            started_at: Instant::now(),
            started_unix,
            emitted: 0,
            ring_buffer_size,
        });
        Ok(())
    }

    fn insert_marker(&mut self, value: f64) -> ProtocolResult<()> {
        if self.stream.is_none() {
            return Err(ProtocolError::MarkerFailed {
                value,
                reason: "synthetic board: stream is not running".into(),
            });
        }
        self.advance();
        self.pending_markers.push_back(value);
        Ok(())
    }

    fn get_board_data(&mut self) -> ProtocolResult<Array2<f64>> {
        if !self.prepared {
            return Err(Self::not_prepared("fetch data"));
        }
        self.advance();
        let rows = self.layout.num_rows();
        let samples: Vec<Vec<f64>> = self.buffer.drain(..).collect();
        Ok(Array2::from_shape_fn((rows, samples.len()), |(r, c)| {
            samples[c][r]
        }))
    }

    fn stop_stream(&mut self) -> ProtocolResult<()> {
        self.advance();
        if self.stream.take().is_none() {
            return Err(ProtocolError::StreamFailed {
                reason: "synthetic board: stream is not running".into(),
            });
        }
        if !self.pending_markers.is_empty() {
            tracing::warn!(
                dropped = self.pending_markers.len(),
                "Markers inserted after the last sample were dropped"
            );
            self.pending_markers.clear();
        }
        Ok(())
    }

    fn release_session(&mut self) -> ProtocolResult<()> {
        self.stream = None;
        self.buffer.clear();
        self.pending_markers.clear();
        self.prepared = false;
        Ok(())
    }
}
