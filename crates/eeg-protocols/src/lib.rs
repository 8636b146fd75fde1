//! # eeg-protocols
//!
//! Experiment-control protocols for EEG acquisition boards that follow the
//! BrainFlow session lifecycle.
//!
//! The crate does no signal processing. It sequences a board session through
//! timed phases and operator gates, writes phase markers into the stream, and
//! saves the captured block as a `.npy` file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use eeg_protocols::board::{ConnectionParams, SessionGuard, StreamSettings, open_board};
//! use eeg_protocols::cue::SilentCue;
//! use eeg_protocols::gate::ScriptedGate;
//! use eeg_protocols::protocols::resting_state::{self, RestingStatePlan};
//! use eeg_protocols::recording::{DataStore, RecordingLabel};
//! use eeg_protocols::ProtocolConfig;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> eeg_protocols::ProtocolResult<()> {
//!     let config = ProtocolConfig::discover(None)?;
//!     let params = ConnectionParams { board_id: -1, ..ConnectionParams::default() };
//!     let settings = StreamSettings {
//!         ring_buffer_size: config.board.ring_buffer_size,
//!         streamer_params: String::new(),
//!     };
//!     let mut session = SessionGuard::open(open_board(&params)?, settings)?;
//!
//!     // Two eyes-closed sessions, then stop.
//!     let mut gate = ScriptedGate::new(["c", "c"]);
//!     let label = RecordingLabel::new(Some("s01".into()), Some("sober".into()));
//!     let plan = RestingStatePlan::from_config(&config, label, Some(1));
//!     let store = DataStore::new(&config.output_dir);
//!
//!     let report =
//!         resting_state::run(&mut session, &mut gate, &mut SilentCue::new(), &store, &plan).await?;
//!     println!("saved {} sessions", report.recordings.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`board`] | Board session contract, lifecycle guard, synthetic board |
//! | [`gate`] | Operator wait-for-signal abstraction |
//! | [`cue`] | Audio cue contract |
//! | [`recording`] | File naming and `.npy` persistence |
//! | [`protocols`] | The drug-exposure and resting-state protocols |
//! | [`config`] | `eeg-protocols.toml` discovery and defaults |

pub mod board;
pub mod config;
pub mod cue;
pub mod error;
pub mod gate;
pub mod protocols;
pub mod recording;

// ─── Public re-exports ──────────────────────────────────────────────────

pub use board::{BoardSession, ConnectionParams, SessionGuard};
pub use config::ProtocolConfig;
pub use error::{ProtocolError, ProtocolResult};
