//! Repeatable resting-state protocol.
//!
//! The session is prepared once; every iteration starts and stops the
//! stream on it, and the session is released once after the operator ends
//! the loop.
//!
//! ```text
//! gate(condition) → [ stream → rest <duration> → fetch → stop → save → cue → gate(next condition) ]* → release
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::board::{BoardSession, SessionGuard};
use crate::config::ProtocolConfig;
use crate::cue::CuePlayer;
use crate::error::ProtocolResult;
use crate::gate::{Condition, Gate, wait_for_condition};
use crate::recording::{DataStore, RecordingLabel};

pub const CONDITION_PROMPT: &str =
    "eyes open [o] or closed [c]? press [o] or [c] and then enter to start";

#[must_use]
pub fn next_condition_prompt(duration_minutes: u64) -> String {
    format!(
        "data saved. Press [o] or [c] and then enter for another {duration_minutes} minutes, \
         or ctrl+c to abort"
    )
}

#[derive(Debug, Clone)]
pub struct RestingStatePlan {
    pub label: RecordingLabel,
    pub duration_minutes: u64,
}

impl RestingStatePlan {
    /// Plan with `duration_minutes`, or the configured default when `None`.
    #[must_use]
    pub fn from_config(
        config: &ProtocolConfig,
        label: RecordingLabel,
        duration_minutes: Option<u64>,
    ) -> Self {
        Self {
            label,
            duration_minutes: duration_minutes.unwrap_or(config.resting_state.duration_minutes),
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_minutes.saturating_mul(60))
    }
}

/// One saved session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecording {
    /// 1-based session number.
    pub session: u32,
    pub condition: String,
    pub path: PathBuf,
    pub samples: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RestingStateReport {
    pub recordings: Vec<SessionRecording>,
}

async fn record_session<B: BoardSession>(
    session: &mut SessionGuard<B>,
    store: &DataStore,
    plan: &RestingStatePlan,
    number: u32,
    condition: &str,
) -> ProtocolResult<SessionRecording> {
    session.start_stream()?;
    tracing::info!(
        session = number,
        condition = Condition::describe(condition),
        minutes = plan.duration_minutes,
        "Measuring..."
    );
    tokio::time::sleep(plan.duration()).await;

    let data = session.get_board_data()?;
    let stopped = session.stop_stream();

    let path = store.save(&plan.label.session_file_name(number, condition), &data)?;
    if let Err(e) = stopped {
        tracing::error!(path = %path.display(), error = %e, "Session saved, but the stream did not stop");
        return Err(e);
    }
    Ok(SessionRecording {
        session: number,
        condition: condition.to_string(),
        path,
        samples: data.ncols(),
    })
}

/// Run resting-state sessions until the operator aborts at a gate.
///
/// An abort at a gate is the normal way to finish and yields `Ok`; the
/// recordings saved so far are in the report.
///
/// # Errors
/// Device, console and persistence errors propagate; the session is then
/// released by the guard.
pub async fn run<B, G, C>(
    session: &mut SessionGuard<B>,
    gate: &mut G,
    cue: &mut C,
    store: &DataStore,
    plan: &RestingStatePlan,
) -> ProtocolResult<RestingStateReport>
where
    B: BoardSession,
    G: Gate + ?Sized,
    C: CuePlayer + ?Sized,
{
    let mut report = RestingStateReport::default();

    let mut condition = match wait_for_condition(gate, CONDITION_PROMPT).await {
        Ok(condition) => condition,
        Err(e) if e.is_interrupt() => {
            tracing::info!("Aborted before the first session");
            session.release()?;
            return Ok(report);
        }
        Err(e) => return Err(e),
    };

    let next_prompt = next_condition_prompt(plan.duration_minutes);
    let mut number: u32 = 1;
    loop {
        let recording = record_session(session, store, plan, number, &condition).await?;
        report.recordings.push(recording);
        super::play_cue(cue);

        match wait_for_condition(gate, &next_prompt).await {
            Ok(next) => condition = next,
            Err(e) if e.is_interrupt() => break,
            Err(e) => return Err(e),
        }
        number += 1;
    }

    tracing::info!(sessions = report.recordings.len(), "Resting-state run finished");
    session.release()?;
    Ok(report)
}
