#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("state identifier is empty")]
    EmptyStateId,

    #[error("state identifier {0:?} contains whitespace or control characters")]
    InvalidStateId(String),
}

#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    #[error("no panel registered at {0:?}")]
    UnregisteredPanel(String),

    #[error("io error {0}")]
    IO(#[from] std::io::Error),
}
