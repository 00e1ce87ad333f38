use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Climb did not converge after {steps} steps: altitude {altitude:.2} m, target {target:.2} m"
    )]
    DidNotConverge {
        steps: usize,
        altitude: f64,
        target: f64,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Why a single propulsion query produced no usable sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineQueryError {
    #[error("engine rejected query: {0}")]
    Rejected(String),

    #[error("engine returned non-finite value {0}")]
    NonFinite(f64),

    #[error("engine returned negative value {0}")]
    Negative(f64),

    #[error("fuel consumption requested before any thrust evaluation")]
    NoOperatingPoint,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown strategy profile: {0}")]
    UnknownProfile(String),
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install logger: {0}")]
    Init(String),
}
