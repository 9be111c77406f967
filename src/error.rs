use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Participant not found in match: {0}")]
    ParticipantNotFound(String),
}

/// Reasons a participant cannot be scored. These are data-quality outcomes,
/// not failures: the engine reports them as an absent score.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unscoreable {
    #[error("game duration must be positive")]
    InvalidDuration,

    #[error("total damage dealt is zero or missing")]
    MissingDamage,

    #[error("no baseline for {champion} has enough games (requested patch {patch})")]
    InsufficientBaseline { champion: String, patch: String },
}
