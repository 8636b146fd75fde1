//! Audio cue played at phase transitions.

use crate::error::ProtocolResult;

/// Fire-and-forget cue signalling the operator or participant.
pub trait CuePlayer {
    fn play(&mut self) -> ProtocolResult<()>;
}

impl<C: CuePlayer + ?Sized> CuePlayer for &mut C {
    fn play(&mut self) -> ProtocolResult<()> {
        (**self).play()
    }
}

impl<C: CuePlayer + ?Sized> CuePlayer for Box<C> {
    fn play(&mut self) -> ProtocolResult<()> {
        (**self).play()
    }
}

/// Cue that only logs; used when no audio output is available.
#[derive(Debug, Default)]
pub struct SilentCue {
    played: usize,
}

impl SilentCue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn played(&self) -> usize {
        self.played
    }
}

impl CuePlayer for SilentCue {
    fn play(&mut self) -> ProtocolResult<()> {
        self.played += 1;
        tracing::info!(count = self.played, "Cue (silent)");
        Ok(())
    }
}
