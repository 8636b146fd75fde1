use std::future::Future;
use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use eeg_protocols::board::{BoardSession, SessionGuard, open_board};
use eeg_protocols::recording::DataStore;
use eeg_protocols::{ProtocolConfig, ProtocolError, ProtocolResult};

use crate::args::RunArgs;

/// Exit status after Ctrl+C or an operator abort (128 + SIGINT).
pub const EXIT_INTERRUPTED: u8 = 130;

/// A prepared board behind the session guard.
pub type Session = SessionGuard<Box<dyn BoardSession + Send>>;

/// How a protocol run ended, from the operator's point of view.
#[derive(Debug)]
pub enum RunOutcome<T> {
    Completed(T),
    Interrupted,
    Failed(ProtocolError),
}

impl<T> RunOutcome<T> {
    /// Classify the result of [`until_interrupted`]; `None` means Ctrl+C won the race.
    pub fn from_race(result: Option<ProtocolResult<T>>) -> Self {
        match result {
            Some(Ok(value)) => RunOutcome::Completed(value),
            Some(Err(e)) if e.is_interrupt() => RunOutcome::Interrupted,
            Some(Err(e)) => RunOutcome::Failed(e),
            None => RunOutcome::Interrupted,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            RunOutcome::Completed(_) => ExitCode::SUCCESS,
            RunOutcome::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
            RunOutcome::Failed(_) => ExitCode::FAILURE,
        }
    }
}

pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "eeg_protocols=debug,eeg_protocols_cli=debug"
    } else {
        "eeg_protocols=info,eeg_protocols_cli=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Discover the config file and apply command-line overrides on top.
pub fn load_config(args: &RunArgs) -> ProtocolResult<ProtocolConfig> {
    let mut config = ProtocolConfig::discover(args.config.as_deref())?;
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(cue) = &args.cue_file {
        config.cue_file.clone_from(cue);
    }
    config.validate()?;
    Ok(config)
}

/// Open the board named by `--board-id` and prepare its session.
pub fn open_session(args: &RunArgs, config: &ProtocolConfig) -> ProtocolResult<Session> {
    let connection = &args.connection;
    let board = open_board(&connection.params())?;
    let settings = connection.stream_settings(config.board.ring_buffer_size);
    SessionGuard::open(board, settings)
}

/// Run `future` until it finishes or Ctrl+C is pressed.
///
/// On Ctrl+C the future is dropped and `None` is returned; the caller still
/// owns the session and releases it.
pub async fn until_interrupted<F: Future>(future: F) -> Option<F::Output> {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    tokio::select! {
        output = future => Some(output),
        () = interrupt => None,
    }
}

/// Build a runtime, drive `main` to completion, and return its exit code.
///
/// Blocking prompt reads may still be pending when a run is interrupted, so
/// the runtime is shut down without waiting for them.
pub fn block_on<F>(main: F) -> ExitCode
where
    F: Future<Output = ExitCode>,
{
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{} {}", "Failed to start runtime:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    let code = runtime.block_on(main);
    runtime.shutdown_background();
    code
}

// ─── Operator output ────────────────────────────────────────────────────

pub fn print_banner(title: &str, args: &RunArgs, config: &ProtocolConfig) {
    println!("{}", format!("══ {title} ══").bright_blue().bold());
    println!(
        "  Board {} | Subject {} | Drug {}",
        args.connection.board_id.to_string().cyan(),
        display_or_unset(&args.sub),
        display_or_unset(&args.drug),
    );
    println!(
        "  Saving to {}\n",
        config.output_dir.display().to_string().cyan()
    );
}

fn display_or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "(unset)".dimmed().to_string()
    } else {
        value.cyan().to_string()
    }
}

/// Report a setup or protocol error and return the failure exit code.
pub fn report_error(context: &str, error: &ProtocolError) -> ExitCode {
    tracing::error!(error = %error, "{context}");
    eprintln!("{} {}", format!("{context}:").red(), error);
    if matches!(error, ProtocolError::ConnectionFailed { .. }) {
        eprintln!("Check the board id and connection flags (e.g. --serial-port).");
    }
    ExitCode::FAILURE
}

/// Release the device after a run and report how it ended.
pub fn finish<T>(session: &mut Session, store: &DataStore, outcome: &RunOutcome<T>) -> ExitCode {
    if let Err(e) = session.release() {
        eprintln!("{} {}", "Warning: release failed:".yellow(), e);
    }
    match outcome {
        RunOutcome::Completed(_) => {
            println!(
                "{} Recordings are in {}",
                "Done.".green().bold(),
                store.output_dir().display()
            );
        }
        RunOutcome::Interrupted => {
            tracing::warn!("Run interrupted; unsaved data was discarded");
            println!("\n{}", "Interrupted. Board released.".yellow());
        }
        RunOutcome::Failed(e) => {
            report_error("Protocol failed", e);
        }
    }
    outcome.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;

    use eeg_protocols::board::{SessionState, StreamSettings, SyntheticBoard};

    fn synthetic_session() -> Session {
        let board: Box<dyn BoardSession + Send> = Box::new(SyntheticBoard::new());
        SessionGuard::open(
            board,
            StreamSettings {
                ring_buffer_size: 1000,
                streamer_params: String::new(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_outcome_classification() {
        assert!(matches!(
            RunOutcome::from_race(Some(Ok(3))),
            RunOutcome::Completed(3)
        ));
        assert!(matches!(
            RunOutcome::<()>::from_race(Some(Err(ProtocolError::Interrupted))),
            RunOutcome::Interrupted
        ));
        assert!(matches!(
            RunOutcome::<()>::from_race(None),
            RunOutcome::Interrupted
        ));
        assert!(matches!(
            RunOutcome::<()>::from_race(Some(Err(ProtocolError::StreamFailed {
                reason: "x".into()
            }))),
            RunOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunOutcome::Completed(()).exit_code(), ExitCode::SUCCESS);
        assert_eq!(
            RunOutcome::<()>::Interrupted.exit_code(),
            ExitCode::from(EXIT_INTERRUPTED)
        );
        assert_eq!(
            RunOutcome::<()>::Failed(ProtocolError::Interrupted).exit_code(),
            ExitCode::FAILURE
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_until_interrupted_returns_finished_output() {
        let out = until_interrupted(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            7
        })
        .await;
        assert_eq!(out, Some(7));
    }

    #[test]
    fn test_finish_releases_streaming_session() {
        let mut session = synthetic_session();
        session.start_stream().unwrap();
        let store = DataStore::new(std::env::temp_dir());

        let code = finish(&mut session, &store, &RunOutcome::<()>::Interrupted);
        assert_eq!(code, ExitCode::from(EXIT_INTERRUPTED));
        assert_eq!(session.state(), SessionState::Released);
    }

    #[test]
    fn test_open_session_with_synthetic_board() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            run: RunArgs,
        }

        let cli = TestCli::try_parse_from(["test", "--board-id", "-1"]).unwrap();
        let config = ProtocolConfig::default();
        let session = open_session(&cli.run, &config).unwrap();
        assert_eq!(session.state(), SessionState::Prepared);
        assert_eq!(session.board().board_id(), -1);
        assert_eq!(session.settings().ring_buffer_size, 450_000);
    }
}
