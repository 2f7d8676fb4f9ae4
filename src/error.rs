use thiserror::Error;

pub type Result<T> = std::result::Result<T, LocmapError>;

#[derive(Error, Debug)]
pub enum LocmapError {
    #[error("GitHub API error: {0}")]
    Api(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Clone error: {0}")]
    Clone(String),
    #[error("Analyzer error: {0}")]
    Analyzer(String),
    #[error("no repositories were successfully cloned")]
    NoRepositories,
    #[error("Invalid identity pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}
