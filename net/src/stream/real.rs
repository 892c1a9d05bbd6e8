use std::{fmt::Debug, net::TcpStream};

use log::{debug, trace, warn};
use tungstenite::{stream::MaybeTlsStream, Message, WebSocket};

use crate::{error::Error, retry::RetryPolicy};

use super::{Frame, FrameSource};

/// Client end of a WebSocket connection.
pub struct WsStream {
    url: String,
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl Debug for WsStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsStream").field("url", &self.url).finish()
    }
}

impl WsStream {
    pub fn connect(url: &str) -> Result<Self, Error> {
        let (socket, response) = tungstenite::connect(url)?;
        debug!("connected to {url} with status {}", response.status());
        Ok(Self {
            url: url.to_owned(),
            socket,
        })
    }

    pub fn retryable_connect<P>(url: &str, mut policy: P) -> Result<Self, Error>
    where
        P: RetryPolicy,
    {
        loop {
            match Self::connect(url) {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    if policy.retry() {
                        warn!("retrying connection to {url}: {err}");
                    } else {
                        debug!("last connection attempt to {url} failed: {err}");
                        return Err(Error::RetriesExhausted(url.to_owned()));
                    }
                }
            }
        }
    }
}

impl FrameSource for WsStream {
    fn read_frame(&mut self) -> Result<Frame, Error> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Frame::Text(text)),
                Ok(Message::Binary(bytes)) => return Ok(Frame::Binary(bytes)),
                Ok(Message::Close(frame)) => {
                    debug!("{} closed the connection: {frame:?}", self.url);
                    return Ok(Frame::Closed);
                }
                Ok(other) => trace!("skipping control frame {other:?}"),
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(Frame::Closed);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
