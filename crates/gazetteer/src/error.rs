use thiserror::Error;

#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("failed to read gazetteer {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid gazetteer json: {0}")]
    Parse(#[from] serde_json::Error),
}
