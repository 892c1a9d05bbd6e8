#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("hub rejected the state with status {0}")]
    Rejected(u16),

    #[error("http error {0}")]
    Http(#[from] Box<ureq::Error>),
}
