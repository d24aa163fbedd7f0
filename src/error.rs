use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("terminal i/o failed")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("could not encode config for {path}")]
    ConfigEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not open log file {path}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Audio is best effort; these never reach the player.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("audio output failed")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("{0} is not supported by this audio sink")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
