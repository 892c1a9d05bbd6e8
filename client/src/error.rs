#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error {0}")]
    IO(#[from] std::io::Error),

    #[error("config error {0}")]
    Config(#[from] config::Error),

    #[error("display setup error {0}")]
    Panels(#[from] display::Error),

    #[error("display error {0}")]
    Display(#[from] pacing::DisplayError),

    #[error("failed to connect to state arbiter: {0}")]
    Connect(#[from] net::Error),
}
