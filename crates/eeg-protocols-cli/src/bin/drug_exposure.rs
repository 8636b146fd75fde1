//! Baseline rest, drug intake, and post-intake recording with three phase
//! markers, saved to a single `.npy` file.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use eeg_protocols::protocols::drug_exposure::{self, DrugExposurePlan};
use eeg_protocols::recording::DataStore;
use eeg_protocols_cli::app::{self, RunOutcome};
use eeg_protocols_cli::{ConsoleGate, RunArgs, audio};

/// Record EEG around a drug intake, marking rest end, intake start and intake end.
#[derive(Parser)]
#[command(name = "drug-exposure", version, about)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
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

    let plan = DrugExposurePlan::from_config(&config, cli.run.label());
    let store = DataStore::new(&config.output_dir);
    let mut gate = ConsoleGate::new();
    let mut cue = audio::cue_player(&config.cue_file, cli.run.mute);

    app::print_banner("Drug exposure", &cli.run, &config);
    println!(
        "  Baseline {}s, then {} min after intake\n",
        plan.timing.baseline_secs, plan.timing.post_minutes
    );

    let result = app::until_interrupted(drug_exposure::run(
        &mut session,
        &mut gate,
        &mut cue,
        &store,
        &plan,
    ))
    .await;
    let outcome = RunOutcome::from_race(result);

    if let RunOutcome::Completed(report) = &outcome {
        for (phase, code) in &report.markers {
            println!("  marker {code} at {phase:?}");
        }
        println!(
            "  {} samples saved to {}",
            report.samples,
            report.path.display().to_string().cyan()
        );
    }
    app::finish(&mut session, &store, &outcome)
}
