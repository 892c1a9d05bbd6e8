use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read panel {path:?}: {source}")]
    ReadPanel {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("panel key {0}")]
    InvalidKey(#[from] pacing::Error),
}
