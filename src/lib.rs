// Library surface for the game core, headless tests and the TUI binary.
pub mod app_dirs;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod level;
pub mod problem;
pub mod runtime;
pub mod schedule;
pub mod score;
pub mod session;
