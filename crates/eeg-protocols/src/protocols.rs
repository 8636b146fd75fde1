//! # Experiment Protocols
//!
//! Each protocol is an async function over its collaborators:
//!
//! - a [`SessionGuard`](crate::board::SessionGuard) around the board,
//! - a [`Gate`](crate::gate::Gate) for operator rendezvous,
//! - a [`CuePlayer`](crate::cue::CuePlayer),
//! - a [`DataStore`](crate::recording::DataStore).
//!
//! Timed phases use `tokio::time::sleep`, so running a protocol on a paused
//! tokio clock executes it instantly while preserving elapsed-time accounting.
//!
//! | Protocol | Module |
//! |----------|--------|
//! | Baseline → exposure → post period, one file | [`drug_exposure`] |
//! | Repeated resting-state sessions, one file each | [`resting_state`] |

pub mod drug_exposure;
pub mod resting_state;

use crate::cue::CuePlayer;

/// Play the cue; a failing cue is logged and never aborts a run.
fn play_cue<C: CuePlayer + ?Sized>(cue: &mut C) {
    if let Err(e) = cue.play() {
        tracing::warn!(error = %e, "Audio cue failed, continuing");
    }
}
