#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error {0}")]
    IO(#[from] std::io::Error),

    #[error("config error {0}")]
    Config(#[from] config::Error),

    #[error("thread pool error {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("http server error {0}")]
    Http(String),
}
