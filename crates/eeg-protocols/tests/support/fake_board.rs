#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use eeg_protocols::board::layout::CYTON;
use eeg_protocols::cue::CuePlayer;
use eeg_protocols::{BoardSession, ProtocolError, ProtocolResult};
use ndarray::Array2;

pub const SAMPLES_PER_FETCH: usize = 16;

/// Board call as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare,
    StartStream {
        ring_buffer_size: usize,
        streamer_params: String,
    },
    InsertMarker(f64),
    GetBoardData,
    StopStream,
    Release,
}

/// Where the fake board should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Prepare,
    /// The n-th `start_stream` call (1-based).
    StartStream(usize),
    /// The n-th `insert_marker` call (1-based).
    Marker(usize),
    GetBoardData,
    /// Every `stop_stream` call.
    StopStream,
    Release,
}

/// Shared view on the calls a [`FakeBoard`] received, usable after the
/// board itself was moved into a guard (or dropped with it).
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.lock().push(call);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.lock().iter().filter(|c| predicate(c)).count()
    }

    pub fn markers(&self) -> Vec<f64> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                Call::InsertMarker(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn starts(&self) -> usize {
        self.count(|c| matches!(c, Call::StartStream { .. }))
    }

    pub fn stops(&self) -> usize {
        self.count(|c| *c == Call::StopStream)
    }

    pub fn releases(&self) -> usize {
        self.count(|c| *c == Call::Release)
    }

    pub fn prepares(&self) -> usize {
        self.count(|c| *c == Call::Prepare)
    }
}

/// Board double that records every call and returns small data blocks.
pub struct FakeBoard {
    log: CallLog,
    fail_on: Option<FailOn>,
    starts: usize,
    markers: usize,
    unfetched_markers: Vec<f64>,
}

impl FakeBoard {
    pub fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        let board = Self {
            log: log.clone(),
            fail_on: None,
            starts: 0,
            markers: 0,
            unfetched_markers: Vec::new(),
        };
        (board, log)
    }

    pub fn failing_on(fail_on: FailOn) -> (Self, CallLog) {
        let (mut board, log) = Self::new();
        board.fail_on = Some(fail_on);
        (board, log)
    }
}

impl BoardSession for FakeBoard {
    fn board_id(&self) -> i32 {
        0
    }

    fn prepare_session(&mut self) -> ProtocolResult<()> {
        self.log.push(Call::Prepare);
        if self.fail_on == Some(FailOn::Prepare) {
            return Err(ProtocolError::ConnectionFailed {
                board_id: 0,
                reason: "unable to open /dev/ttyUSB0".into(),
            });
        }
        Ok(())
    }

    fn start_stream(
        &mut self,
        ring_buffer_size: usize,
        streamer_params: &str,
    ) -> ProtocolResult<()> {
        self.starts += 1;
        self.log.push(Call::StartStream {
            ring_buffer_size,
            streamer_params: streamer_params.to_string(),
        });
        if self.fail_on == Some(FailOn::StartStream(self.starts)) {
            return Err(ProtocolError::StreamFailed {
                reason: "board not responding".into(),
            });
        }
        Ok(())
    }

    fn insert_marker(&mut self, value: f64) -> ProtocolResult<()> {
        self.markers += 1;
        self.log.push(Call::InsertMarker(value));
        if self.fail_on == Some(FailOn::Marker(self.markers)) {
            return Err(ProtocolError::MarkerFailed {
                value,
                reason: "marker queue full".into(),
            });
        }
        self.unfetched_markers.push(value);
        Ok(())
    }

    fn get_board_data(&mut self) -> ProtocolResult<Array2<f64>> {
        self.log.push(Call::GetBoardData);
        if self.fail_on == Some(FailOn::GetBoardData) {
            return Err(ProtocolError::StreamFailed {
                reason: "buffer read failed".into(),
            });
        }
        let mut data = Array2::<f64>::zeros((CYTON.num_rows(), SAMPLES_PER_FETCH));
        for (i, value) in self.unfetched_markers.drain(..).enumerate() {
            data[[CYTON.marker, i]] = value;
        }
        Ok(data)
    }

    fn stop_stream(&mut self) -> ProtocolResult<()> {
        self.log.push(Call::StopStream);
        if self.fail_on == Some(FailOn::StopStream) {
            return Err(ProtocolError::StreamFailed {
                reason: "stop command timed out".into(),
            });
        }
        Ok(())
    }

    fn release_session(&mut self) -> ProtocolResult<()> {
        self.log.push(Call::Release);
        if self.fail_on == Some(FailOn::Release) {
            return Err(ProtocolError::StreamFailed {
                reason: "device vanished during release".into(),
            });
        }
        Ok(())
    }
}

/// Cue double counting how often it was played.
#[derive(Debug, Default)]
pub struct CountingCue {
    pub plays: usize,
    pub fail: bool,
}

impl CuePlayer for CountingCue {
    fn play(&mut self) -> ProtocolResult<()> {
        self.plays += 1;
        if self.fail {
            return Err(ProtocolError::AudioError {
                reason: "no output device".into(),
            });
        }
        Ok(())
    }
}
