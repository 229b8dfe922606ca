#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Incomplete bid: {0}")]
    IncompleteBid(String),
    #[error("Invalid domain configuration: {0}")]
    InvalidDomainConfiguration(String),
    #[error("Unsupported profile format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to read profile. {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON profile. {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse YAML profile. {0}")]
    Yaml(#[from] serde_yaml::Error),
}
