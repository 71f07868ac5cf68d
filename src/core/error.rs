use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Name already in use: {0}")]
    NameInUse(String),

    #[error("Trying to create {kind} of unknown type: {type_name}")]
    UnknownType { kind: &'static str, type_name: String },

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Structure not found: {0}")]
    StructureNotFound(String),

    #[error("Agent is not alive: {0}")]
    AgentNotAlive(String),

    #[error("{0}: I cannot attack myself!")]
    InvalidTarget(String),

    #[error("{0}: Target is not alive!")]
    TargetNotAlive(String),

    #[error("{0}: Target is out of range!")]
    OutOfRange(String),

    #[error("{0}: I can't move food to and from the same place!")]
    SameSourceAndDestination(String),

    #[error("{0}: Sorry, I can't work!")]
    CannotWork(String),

    #[error("{0}: Sorry, I can't attack!")]
    CannotAttack(String),

    #[error("New map size is too big!")]
    MapSizeTooBig,

    #[error("New map size is too small!")]
    MapSizeTooSmall,

    #[error("New map scale must be positive!")]
    MapScaleNotPositive,

    #[error("Unrecognized command: {0}")]
    UnrecognizedCommand(String),

    #[error("Invalid name for new object: {0}")]
    InvalidObjectName(String),

    #[error("Expected an integer!")]
    ExpectedInteger,

    #[error("Expected a number!")]
    ExpectedNumber,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
