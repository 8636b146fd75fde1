//! # Board Sessions
//!
//! [`BoardSession`] is the contract an acquisition device has to honour,
//! modelled on the BrainFlow `BoardShim` lifecycle:
//!
//! ```text
//! prepare_session → start_stream → insert_marker* → get_board_data → stop_stream → release_session
//! ```
//!
//! `start_stream`/`stop_stream` may repeat any number of times between one
//! `prepare_session` and one `release_session`.
//!
//! Protocols never talk to a [`BoardSession`] directly; they go through a
//! [`SessionGuard`], which tracks the lifecycle state, rejects out-of-order
//! calls, and releases the device on every exit path (including `Drop`).
//!
//! ## Boards
//!
//! | Board id | Implementation | Notes |
//! |----------|----------------|-------|
//! | `-1` | [`SyntheticBoard`] | Built in, no hardware, deterministic signal |
//! | anything else | `BrainFlowBoard` | Requires the `brainflow` feature |

use ndarray::Array2;

use crate::error::{ProtocolError, ProtocolResult};

#[cfg(feature = "brainflow")]
pub mod brainflow;
pub mod layout;
pub mod synthetic;

pub use layout::{ChannelLayout, MarkerEvent};
pub use synthetic::SyntheticBoard;

/// Board id of the built-in synthetic board (same id BrainFlow uses).
pub const SYNTHETIC_BOARD_ID: i32 = -1;

/// Everything needed to open a board, mirroring the SDK's input params.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Board identifier, see the SDK's board list.
    pub board_id: i32,
    /// Timeout for device discovery or connection, in seconds.
    pub timeout: u32,
    pub ip_port: u16,
    /// IP protocol, as the SDK's `IpProtocolType` discriminant.
    pub ip_protocol: i32,
    pub ip_address: String,
    pub serial_port: String,
    pub mac_address: String,
    pub other_info: String,
    pub serial_number: String,
    /// Input file for playback boards.
    pub file: String,
}

/// Arguments handed to every `start_stream` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub ring_buffer_size: usize,
    /// Opaque SDK string routing streamed data to an extra sink.
    pub streamer_params: String,
}

/// An acquisition device session.
pub trait BoardSession {
    fn board_id(&self) -> i32;

    /// Open the connection and allocate SDK resources.
    fn prepare_session(&mut self) -> ProtocolResult<()>;

    fn start_stream(&mut self, ring_buffer_size: usize, streamer_params: &str)
    -> ProtocolResult<()>;

    /// Write `value` into the marker row of the next sample.
    fn insert_marker(&mut self, value: f64) -> ProtocolResult<()>;

    /// Drain every buffered sample (rows = channels, columns = samples).
    fn get_board_data(&mut self) -> ProtocolResult<Array2<f64>>;

    fn stop_stream(&mut self) -> ProtocolResult<()>;

    fn release_session(&mut self) -> ProtocolResult<()>;
}

impl<B: BoardSession + ?Sized> BoardSession for Box<B> {
    fn board_id(&self) -> i32 {
        (**self).board_id()
    }

    fn prepare_session(&mut self) -> ProtocolResult<()> {
        (**self).prepare_session()
    }

    fn start_stream(
        &mut self,
        ring_buffer_size: usize,
        streamer_params: &str,
    ) -> ProtocolResult<()> {
        (**self).start_stream(ring_buffer_size, streamer_params)
    }

    fn insert_marker(&mut self, value: f64) -> ProtocolResult<()> {
        (**self).insert_marker(value)
    }

    fn get_board_data(&mut self) -> ProtocolResult<Array2<f64>> {
        (**self).get_board_data()
    }

    fn stop_stream(&mut self) -> ProtocolResult<()> {
        (**self).stop_stream()
    }

    fn release_session(&mut self) -> ProtocolResult<()> {
        (**self).release_session()
    }
}

/// Pick the board implementation for `params.board_id`.
///
/// The returned board is not prepared yet; hand it to [`SessionGuard::open`].
///
/// # Errors
/// Returns [`ProtocolError::ConnectionFailed`] when the id needs the SDK and
/// this build does not include it, or when the SDK rejects the parameters.
pub fn open_board(params: &ConnectionParams) -> ProtocolResult<Box<dyn BoardSession + Send>> {
    if params.board_id == SYNTHETIC_BOARD_ID {
        tracing::info!("Using the built-in synthetic board");
        return Ok(Box::new(SyntheticBoard::new()));
    }
    open_sdk_board(params)
}

#[cfg(feature = "brainflow")]
fn open_sdk_board(params: &ConnectionParams) -> ProtocolResult<Box<dyn BoardSession + Send>> {
    Ok(Box::new(brainflow::BrainFlowBoard::new(params)?))
}

#[cfg(not(feature = "brainflow"))]
fn open_sdk_board(params: &ConnectionParams) -> ProtocolResult<Box<dyn BoardSession + Send>> {
    Err(ProtocolError::ConnectionFailed {
        board_id: params.board_id,
        reason: format!(
            "this build only supports the synthetic board ({SYNTHETIC_BOARD_ID}); \
             rebuild with `--features brainflow` for hardware"
        ),
    })
}

// ─── Session guard ──────────────────────────────────────────────────────

/// Lifecycle state of a guarded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Prepared,
    Streaming,
    Released,
}

impl SessionState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Prepared => "prepared",
            SessionState::Streaming => "streaming",
            SessionState::Released => "released",
        }
    }
}

/// Owns a prepared board session and guarantees it is released exactly once.
///
/// Dropping the guard stops a running stream and releases the session, so an
/// error, an operator interrupt, or a panic never leaves the device open.
pub struct SessionGuard<B: BoardSession> {
    board: B,
    state: SessionState,
    settings: StreamSettings,
}

impl<B: BoardSession> SessionGuard<B> {
    /// Prepare `board` and take ownership of its lifecycle.
    ///
    /// # Errors
    /// Whatever `prepare_session` reports; the board is left untouched.
    pub fn open(mut board: B, settings: StreamSettings) -> ProtocolResult<Self> {
        board.prepare_session()?;
        tracing::info!(board_id = board.board_id(), "Board session prepared");
        Ok(Self {
            board,
            state: SessionState::Prepared,
            settings,
        })
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn board(&self) -> &B {
        &self.board
    }

    #[must_use]
    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    fn expect_state(&self, expected: SessionState, operation: &'static str) -> ProtocolResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ProtocolError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    pub fn start_stream(&mut self) -> ProtocolResult<()> {
        self.expect_state(SessionState::Prepared, "start stream")?;
        self.board
            .start_stream(self.settings.ring_buffer_size, &self.settings.streamer_params)?;
        self.state = SessionState::Streaming;
        tracing::debug!("Stream started");
        Ok(())
    }

    pub fn insert_marker(&mut self, value: f64) -> ProtocolResult<()> {
        self.expect_state(SessionState::Streaming, "insert marker")?;
        self.board.insert_marker(value)?;
        tracing::info!(value, "Marker inserted");
        Ok(())
    }

    /// Drain the board buffer. Valid while streaming or after a stop.
    pub fn get_board_data(&mut self) -> ProtocolResult<Array2<f64>> {
        if self.state == SessionState::Released {
            return Err(ProtocolError::InvalidState {
                operation: "fetch board data",
                state: self.state.as_str(),
            });
        }
        let data = self.board.get_board_data()?;
        tracing::debug!(rows = data.nrows(), samples = data.ncols(), "Fetched board data");
        Ok(data)
    }

    pub fn stop_stream(&mut self) -> ProtocolResult<()> {
        self.expect_state(SessionState::Streaming, "stop stream")?;
        self.board.stop_stream()?;
        self.state = SessionState::Prepared;
        tracing::debug!("Stream stopped");
        Ok(())
    }

    /// Release the session, stopping a running stream first.
    ///
    /// Calling this on an already released session is a no-op.
    pub fn release(&mut self) -> ProtocolResult<()> {
        if self.state == SessionState::Released {
            return Ok(());
        }
        let mut first_error = None;
        if self.state == SessionState::Streaming {
            tracing::warn!("Releasing a session with a running stream; unsaved samples are discarded");
            if let Err(e) = self.board.stop_stream() {
                first_error = Some(e);
            }
        }
        // Marked released before the SDK call so a failing release is never retried.
        self.state = SessionState::Released;
        if let Err(e) = self.board.release_session() {
            first_error.get_or_insert(e);
        }
        tracing::info!("Board session released");
        first_error.map_or(Ok(()), Err)
    }
}

impl<B: BoardSession> Drop for SessionGuard<B> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::error!(error = %e, "Failed to release board session");
        }
    }
}
