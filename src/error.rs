/*
Errors raised at the boundaries of the engine.

Stepping itself never fails: degenerate geometry is handled by cutoffs,
the hard core and the velocity cap. Everything that can go wrong is either
bad input (config, atoms, element symbols, preset ids) or the host being
driven out of order.
*/

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid atom {index}: {reason}")]
    InvalidAtom { index: usize, reason: String },

    #[error("cannot initialize an engine without atoms")]
    EmptySystem,

    #[error("engine not initialized")]
    NotInitialized,

    #[error("unknown element symbol `{0}`")]
    UnknownElement(String),

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("simulation worker has shut down")]
    WorkerClosed,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message_names_field() {
        let err = SimError::config("dt", "must be positive");
        assert_eq!(err.to_string(), "invalid configuration: dt must be positive");
    }
}
