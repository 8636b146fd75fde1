//! Run a shortened drug-exposure protocol on the synthetic board and print
//! where the phase markers landed.
//!
//! ```sh
//! cargo run -p eeg-protocols --example synthetic_drug_exposure
//! ```

use eeg_protocols::board::layout::CYTON;
use eeg_protocols::board::{SessionGuard, StreamSettings, SyntheticBoard};
use eeg_protocols::config::DrugExposureTiming;
use eeg_protocols::cue::SilentCue;
use eeg_protocols::gate::ScriptedGate;
use eeg_protocols::protocols::drug_exposure::{self, DrugExposurePlan};
use eeg_protocols::recording::{DataStore, RecordingLabel};
use eeg_protocols::ProtocolConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ProtocolConfig::default();
    let settings = StreamSettings {
        ring_buffer_size: config.board.ring_buffer_size,
        streamer_params: String::new(),
    };
    let mut session = SessionGuard::open(SyntheticBoard::new(), settings)?;

    let label = RecordingLabel::new(Some("demo".into()), Some("sober".into()));
    let mut plan = DrugExposurePlan::from_config(&config, label);
    plan.timing = DrugExposureTiming {
        baseline_secs: 2,
        post_minutes: 2,
        tick_secs: 1,
    };

    let store = DataStore::new(std::env::temp_dir());
    let report = drug_exposure::run(
        &mut session,
        &mut ScriptedGate::new(["", "", ""]),
        &mut SilentCue::new(),
        &store,
        &plan,
    )
    .await?;

    let data: ndarray::Array2<f64> = ndarray_npy::read_npy(&report.path)?;
    println!("{} samples -> {}", report.samples, report.path.display());
    for event in CYTON.marker_events(&data) {
        println!("  marker {} at sample {}", event.value, event.sample);
    }
    Ok(())
}
