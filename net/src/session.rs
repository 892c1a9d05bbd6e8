use std::{fmt::Debug, io::ErrorKind, net::TcpStream, time::Duration};

use log::{debug, trace};
use tungstenite::{
    handshake::server::{ErrorResponse, Request, Response},
    http::StatusCode,
    Message, WebSocket,
};

use crate::error::Error;

/// Server end of a WebSocket connection, used to push states to a display.
pub struct Session {
    peer_addr: String,
    socket: WebSocket<TcpStream>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer_addr", &self.peer_addr)
            .finish()
    }
}

impl Session {
    /// Completes the WebSocket handshake on `stream`. Requests for any path
    /// other than `path` are answered with 404.
    ///
    /// `timeout` bounds the handshake and every later write; a peer that
    /// does not send its upgrade request in time is dropped.
    pub fn accept(stream: TcpStream, path: &str, timeout: Duration) -> Result<Self, Error> {
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        let peer_addr = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_owned());

        let socket = tungstenite::accept_hdr(stream, |request: &Request, response: Response| {
            let requested = request.uri().path();
            if requested == path {
                return Ok(response);
            }

            debug!("rejecting websocket upgrade for {requested}");
            let mut rejection = ErrorResponse::new(Some(format!("no websocket at {requested}")));
            *rejection.status_mut() = StatusCode::NOT_FOUND;
            Err(rejection)
        })
        .map_err(|err| Error::Handshake(err.to_string()))?;

        trace!("accepted websocket from {peer_addr}");
        Ok(Self { peer_addr, socket })
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Waits up to `wait` for the peer to say something and reports whether
    /// it is gone. Anything it sends other than a close is ignored.
    pub fn poll_closed(&mut self, wait: Duration) -> bool {
        if let Err(err) = self.socket.get_ref().set_read_timeout(Some(wait)) {
            debug!("set_read_timeout on {}: {err}", self.peer_addr);
            return true;
        }

        match self.socket.read() {
            Ok(Message::Close(_)) => true,
            Ok(message) => {
                trace!("ignoring {message:?} from {}", self.peer_addr);
                false
            }
            Err(tungstenite::Error::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                false
            }
            Err(err) => {
                debug!("{} gone: {err}", self.peer_addr);
                true
            }
        }
    }

    pub fn send_text(&mut self, text: &str) -> Result<(), Error> {
        self.socket.send(Message::Text(text.to_owned()))?;
        Ok(())
    }

    pub fn shutdown(mut self) -> Result<(), Error> {
        debug!("shutting down session {:?}", self);
        match self.socket.close(None) {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => {}
            Err(err) => return Err(err.into()),
        }
        match self.socket.flush() {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
