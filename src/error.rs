#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid pattern for extractor '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("No extractor with id {0}")]
    UnknownExtractor(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Line too long: {length} > {max_length}")]
    LineTooLong { length: usize, max_length: usize },

    #[error("Feed decode error: {0}")]
    FeedError(String),
}
