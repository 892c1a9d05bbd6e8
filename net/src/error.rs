#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error {0}")]
    IO(#[from] std::io::Error),

    #[error("websocket error {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("websocket handshake failed: {0}")]
    Handshake(String),

    #[error("gave up connecting to {0}")]
    RetriesExhausted(String),
}
