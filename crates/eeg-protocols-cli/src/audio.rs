//! Cue players for the CLI.
//!
//! With the `audio` feature the cue file is played through the default
//! output device. Without it (or when no device can be opened) the terminal
//! bell is rung instead.

use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;

use eeg_protocols::ProtocolResult;
use eeg_protocols::cue::{CuePlayer, SilentCue};

/// Pick the cue player for this run.
#[must_use]
pub fn cue_player(cue_file: &Path, mute: bool) -> Box<dyn CuePlayer> {
    if mute {
        return Box::new(SilentCue::new());
    }

    if let Some(cue) = open_sound(cue_file) {
        return cue;
    }
    Box::new(BellCue::new(cue_file))
}

#[cfg(feature = "audio")]
fn open_sound(cue_file: &Path) -> Option<Box<dyn CuePlayer>> {
    match sound::SoundCue::open(cue_file) {
        Ok(cue) => Some(Box::new(cue)),
        Err(e) => {
            tracing::warn!(error = %e, "Audio output unavailable, using the terminal bell");
            None
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_sound(_cue_file: &Path) -> Option<Box<dyn CuePlayer>> {
    None
}

/// Rings the terminal bell and prints a visible notice.
#[derive(Debug)]
pub struct BellCue {
    cue_file: PathBuf,
}

impl BellCue {
    #[must_use]
    pub fn new(cue_file: &Path) -> Self {
        Self {
            cue_file: cue_file.to_path_buf(),
        }
    }
}

impl CuePlayer for BellCue {
    fn play(&mut self) -> ProtocolResult<()> {
        let mut stdout = std::io::stdout();
        write!(stdout, "\x07")?;
        writeln!(stdout, "{}", ">>> cue <<<".bold().yellow())?;
        stdout.flush()?;
        tracing::debug!(cue_file = %self.cue_file.display(), "Cue (bell)");
        Ok(())
    }
}

#[cfg(feature = "audio")]
mod sound {
    use std::path::{Path, PathBuf};

    use eeg_protocols::cue::CuePlayer;
    use eeg_protocols::{ProtocolError, ProtocolResult};

    /// Plays the cue file without blocking the protocol.
    pub struct SoundCue {
        path: PathBuf,
        sink: rodio::Sink,
        // Output stops when the stream is dropped.
        _stream: rodio::OutputStream,
    }

    impl SoundCue {
        pub fn open(path: &Path) -> ProtocolResult<Self> {
            if !path.exists() {
                return Err(ProtocolError::AudioError {
                    reason: format!("cue file '{}' not found", path.display()),
                });
            }
            let stream = rodio::OutputStreamBuilder::open_default_stream().map_err(|e| {
                ProtocolError::AudioError {
                    reason: format!("cannot open audio output: {e}"),
                }
            })?;
            let sink = rodio::Sink::connect_new(stream.mixer());
            Ok(Self {
                path: path.to_path_buf(),
                sink,
                _stream: stream,
            })
        }
    }

    impl CuePlayer for SoundCue {
        fn play(&mut self) -> ProtocolResult<()> {
            let source = rodio::Decoder::try_from(self.path.as_path()).map_err(|e| {
                ProtocolError::AudioError {
                    reason: format!("cannot decode '{}': {e}", self.path.display()),
                }
            })?;
            self.sink.append(source);
            tracing::debug!(cue_file = %self.path.display(), "Cue queued");
            Ok(())
        }
    }
}
