//! Operator prompts on the terminal.

use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;
use dialoguer::Input;

use eeg_protocols::gate::Gate;
use eeg_protocols::{ProtocolError, ProtocolResult};

/// Gate answered by the experimenter at the console.
///
/// Interactive terminals get a dialoguer prompt; piped stdin is read line by
/// line so runs can be scripted. End of input or Ctrl+C at the prompt
/// counts as an operator abort.
#[derive(Debug, Default)]
pub struct ConsoleGate;

impl ConsoleGate {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Gate for ConsoleGate {
    async fn wait(&mut self, prompt: &str) -> ProtocolResult<String> {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || read_answer(&prompt))
            .await
            .map_err(|e| ProtocolError::ConsoleError {
                reason: format!("prompt task failed: {e}"),
            })?
    }
}

fn read_answer(prompt: &str) -> ProtocolResult<String> {
    if io::stdin().is_terminal() {
        let answer = Input::<String>::new()
            .with_prompt(prompt.bold().to_string())
            .allow_empty(true)
            .interact_text();
        return match answer {
            Ok(text) => Ok(text),
            Err(dialoguer::Error::IO(e)) => Err(map_io_error(&e)),
        };
    }

    let mut stdout = io::stdout();
    // Prompt output is best effort; the answer is what matters.
    let _ = write!(stdout, "{prompt}: ");
    let _ = stdout.flush();
    read_piped_line(&mut io::stdin().lock())
}

fn read_piped_line(reader: &mut impl BufRead) -> ProtocolResult<String> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => Err(ProtocolError::Interrupted),
        Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(e) => Err(map_io_error(&e)),
    }
}

fn map_io_error(e: &io::Error) -> ProtocolError {
    match e.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof => ProtocolError::Interrupted,
        _ => ProtocolError::ConsoleError {
            reason: e.to_string(),
        },
    }
}
