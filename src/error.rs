// Error types shared by the generators and the output layer
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Statemachine ARN should be provided, got `{0}`")]
    InvalidStateMachineArn(String),

    #[error("alerts require at least one notification target")]
    NoNotificationTargets,

    #[error("{service} dashboard requires --{flag}")]
    MissingDataSource {
        service: &'static str,
        flag: &'static str,
    },

    #[error("failed to serialize dashboard: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
