//! Error types.
//!
//! Musical-data problems (`ChordError`, `TriggerError`) are recoverable: the
//! compiler and scheduler log them, count them and carry on. Setter-boundary
//! problems (`TransportError`) leave the transport state unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// A chord symbol that could not be understood.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChordError {
    /// The symbol does not start with a note letter A–G, or its slash bass is unreadable.
    #[error("invalid chord symbol '{0}'")]
    InvalidChordSymbol(String),
}

/// A problem reported by the sound-trigger collaborator for one event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("unknown voice '{0}'")]
    UnknownVoice(String),
    #[error("trigger rejected: {0}")]
    Rejected(String),
}

/// A live setting that was refused at the transport boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("invalid tempo {0} BPM")]
    InvalidTempo(f64),
    #[error("invalid time signature {numerator}/{denominator}")]
    InvalidTimeSignature { numerator: u8, denominator: u8 },
    #[error("failed to start driver thread: {0}")]
    DriverSpawn(String),
}

/// A style table that cannot be compiled.
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("voice '{voice}': unknown grid symbol '{symbol}'")]
    InvalidGridSymbol { voice: String, symbol: char },
    #[error("voice '{0}': grid has no steps")]
    EmptyGrid(String),
    #[error("style '{0}' defines no voices")]
    NoVoices(String),
    #[error("unknown style '{0}'")]
    UnknownStyle(String),
    #[error("style yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Engine configuration that could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            ChordError::InvalidChordSymbol("H7".into()).to_string(),
            "invalid chord symbol 'H7'"
        );
        assert_eq!(
            TriggerError::UnknownVoice("cowbell".into()).to_string(),
            "unknown voice 'cowbell'"
        );
        assert_eq!(
            TransportError::InvalidTimeSignature {
                numerator: 4,
                denominator: 3
            }
            .to_string(),
            "invalid time signature 4/3"
        );
        assert_eq!(
            StyleError::InvalidGridSymbol {
                voice: "kick".into(),
                symbol: '?'
            }
            .to_string(),
            "voice 'kick': unknown grid symbol '?'"
        );
    }
}
