//! # eeg-protocols-cli
//!
//! Console front end shared by the `drug-exposure` and `resting-state`
//! binaries: flag parsing, logging setup, the terminal [`ConsoleGate`],
//! cue playback and Ctrl+C handling around a protocol run.
//!
//! Build with `--features brainflow` for hardware boards and
//! `--features audio` to play the cue file through the speakers.

pub mod app;
pub mod args;
pub mod audio;
pub mod console;

pub use args::{ConnectionArgs, RunArgs};
pub use console::ConsoleGate;
