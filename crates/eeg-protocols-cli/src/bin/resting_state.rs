//! Repeated resting-state recordings, one `.npy` file per session, each
//! tagged with the eyes-open / eyes-closed condition given by the operator.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use eeg_protocols::gate::Condition;
use eeg_protocols::protocols::resting_state::{self, RestingStatePlan};
use eeg_protocols::recording::DataStore;
use eeg_protocols_cli::app::{self, RunOutcome};
use eeg_protocols_cli::{ConsoleGate, RunArgs, audio};

/// Record repeated resting-state sessions until the operator stops.
#[derive(Parser)]
#[command(name = "resting-state", version, about)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    /// Minutes per session (default from config, 5)
    #[arg(long)]
    duration: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    app::init_logging(cli.run.verbose);
    app::block_on(run(cli))
}

async fn run(cli: Cli) -> ExitCode {
    let config = match app::load_config(&cli.run) {
        Ok(config) => config,
        Err(e) => return app::report_error("Invalid configuration", &e),
    };
    let mut session = match app::open_session(&cli.run, &config) {
        Ok(session) => session,
        Err(e) => return app::report_error("Cannot open board", &e),
    };

    let plan = RestingStatePlan::from_config(&config, cli.run.label(), cli.duration);
    let store = DataStore::new(&config.output_dir);
    let mut gate = ConsoleGate::new();
    let mut cue = audio::cue_player(&config.cue_file, cli.run.mute);

    app::print_banner("Resting state", &cli.run, &config);
    println!("  {} min per session\n", plan.duration_minutes);

    let result = app::until_interrupted(resting_state::run(
        &mut session,
        &mut gate,
        &mut cue,
        &store,
        &plan,
    ))
    .await;
    let outcome = RunOutcome::from_race(result);

    if let RunOutcome::Completed(report) = &outcome {
        for recording in &report.recordings {
            println!(
                "  session {} ({}): {} samples -> {}",
                recording.session,
                Condition::describe(&recording.condition),
                recording.samples,
                recording.path.display().to_string().cyan()
            );
        }
    }
    app::finish(&mut session, &store, &outcome)
}
