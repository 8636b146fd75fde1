//! Drug-exposure protocol.
//!
//! ```text
//! gate(start) → stream → baseline rest → marker(rest_end) → cue
//!   → gate(smoking starts) → marker(smoking_start)
//!   → gate(smoking done)   → marker(smoking_end)
//!   → post period, logged once per tick
//!   → fetch → stop → release → save data_<sub><drug>.npy
//! ```

use std::path::PathBuf;

use crate::board::{BoardSession, SessionGuard};
use crate::config::{DrugExposureTiming, MarkerCodes, ProtocolConfig};
use crate::cue::CuePlayer;
use crate::error::ProtocolResult;
use crate::gate::Gate;
use crate::recording::{DataStore, RecordingLabel};

pub const START_PROMPT: &str = "press enter to start";
/// Announces both operator steps: enter at intake start, enter again at its end.
pub const REST_OVER_PROMPT: &str = "Your rest is over. Please take your pipe and hit enter when you hit it. \
                                    When you are done smoking, hit enter again.";
pub const SMOKING_DONE_PROMPT: &str = "When you are done smoking, hit enter again.";

/// Phase boundary a marker is written at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RestEnd,
    SmokingStart,
    SmokingEnd,
}

impl Phase {
    #[must_use]
    pub fn code(self, markers: &MarkerCodes) -> f64 {
        match self {
            Phase::RestEnd => markers.rest_end,
            Phase::SmokingStart => markers.smoking_start,
            Phase::SmokingEnd => markers.smoking_end,
        }
    }
}

/// Everything the protocol needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct DrugExposurePlan {
    pub label: RecordingLabel,
    pub markers: MarkerCodes,
    pub timing: DrugExposureTiming,
}

impl DrugExposurePlan {
    #[must_use]
    pub fn from_config(config: &ProtocolConfig, label: RecordingLabel) -> Self {
        Self {
            label,
            markers: config.markers,
            timing: config.drug_exposure.clone(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct DrugExposureReport {
    /// Markers in insertion order.
    pub markers: Vec<(Phase, f64)>,
    pub samples: usize,
    pub path: PathBuf,
}

fn mark<B: BoardSession>(
    session: &mut SessionGuard<B>,
    plan: &DrugExposurePlan,
    phase: Phase,
    inserted: &mut Vec<(Phase, f64)>,
) -> ProtocolResult<()> {
    let code = phase.code(&plan.markers);
    session.insert_marker(code)?;
    tracing::info!(?phase, code, "Phase boundary marked");
    inserted.push((phase, code));
    Ok(())
}

/// Run the drug-exposure protocol on a prepared session.
///
/// The session is released before the recording is written. Once the data
/// block is fetched it is saved even if stopping or releasing the board
/// fails; that error is returned afterwards. On any other error the session
/// is left to the guard, which releases it when dropped.
///
/// # Errors
/// Device, gate ([`Interrupted`](crate::ProtocolError::Interrupted) included)
/// and persistence errors propagate unchanged.
pub async fn run<B, G, C>(
    session: &mut SessionGuard<B>,
    gate: &mut G,
    cue: &mut C,
    store: &DataStore,
    plan: &DrugExposurePlan,
) -> ProtocolResult<DrugExposureReport>
where
    B: BoardSession,
    G: Gate + ?Sized,
    C: CuePlayer + ?Sized,
{
    let mut inserted = Vec::with_capacity(3);

    gate.wait(START_PROMPT).await?;
    session.start_stream()?;

    tracing::info!(secs = plan.timing.baseline_secs, "Baseline rest");
    tokio::time::sleep(plan.timing.baseline()).await;
    mark(session, plan, Phase::RestEnd, &mut inserted)?;
    super::play_cue(cue);

    gate.wait(REST_OVER_PROMPT).await?;
    mark(session, plan, Phase::SmokingStart, &mut inserted)?;

    gate.wait(SMOKING_DONE_PROMPT).await?;
    mark(session, plan, Phase::SmokingEnd, &mut inserted)?;

    for minute in 1..=plan.timing.post_minutes {
        tokio::time::sleep(plan.timing.tick()).await;
        tracing::info!(minute, total = plan.timing.post_minutes, "{minute} minutes passed");
    }

    let data = session.get_board_data()?;
    // A failed stop is left to the guard, which retries it while releasing.
    let teardown = session.stop_stream().and_then(|()| session.release());

    let path = store.save(&plan.label.single_run_file_name(), &data)?;
    if let Err(e) = teardown {
        tracing::error!(path = %path.display(), error = %e, "Recording saved, but board teardown failed");
        return Err(e);
    }
    Ok(DrugExposureReport {
        markers: inserted,
        samples: data.ncols(),
        path,
    })
}
