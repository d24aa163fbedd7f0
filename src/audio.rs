use std::io::Write;

use crate::error::AudioError;

/// Short sound effects requested by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Cue {
    Click,
    Correct,
    GameOver,
}

/// Where sound requests end up. Implementations may fail freely; the
/// engine logs and drops every error.
pub trait AudioSink {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError>;
    fn set_music(&mut self, on: bool) -> Result<(), AudioError>;
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
        (**self).play(cue)
    }

    fn set_music(&mut self, on: bool) -> Result<(), AudioError> {
        (**self).set_music(on)
    }
}

/// Discards everything (used for `--mute` and headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: Cue) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_music(&mut self, _on: bool) -> Result<(), AudioError> {
        Ok(())
    }
}

const BEL: &[u8] = b"\x07";

/// Rings the terminal bell for correct answers and game over.
/// Key clicks stay silent and there is no background track in a terminal.
#[derive(Debug)]
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl TerminalBell<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> AudioSink for TerminalBell<W> {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
        match cue {
            Cue::Click => Ok(()),
            Cue::Correct | Cue::GameOver => {
                self.out.write_all(BEL)?;
                self.out.flush()?;
                Ok(())
            }
        }
    }

    fn set_music(&mut self, on: bool) -> Result<(), AudioError> {
        if on {
            Err(AudioError::Unsupported("background music"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_bell_rings_for_correct_and_game_over() {
        let mut out = Vec::new();
        let mut bell = TerminalBell::new(&mut out);
        bell.play(Cue::Click).unwrap();
        bell.play(Cue::Correct).unwrap();
        bell.play(Cue::GameOver).unwrap();
        drop(bell);
        assert_eq!(out, b"\x07\x07".to_vec());
    }

    #[test]
    fn test_bell_reports_missing_music() {
        let mut bell = TerminalBell::new(Vec::new());
        assert_matches!(bell.set_music(true), Err(AudioError::Unsupported(_)));
        assert!(bell.set_music(false).is_ok());
    }

    #[test]
    fn test_silent_accepts_everything() {
        let mut s = Silent;
        assert!(s.play(Cue::GameOver).is_ok());
        assert!(s.set_music(true).is_ok());
    }
}
