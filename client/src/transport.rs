use std::{
    fmt::Debug,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam::channel::{bounded, Receiver, Sender};
use log::{debug, error, info, trace, warn};

use config::EndpointConfig;
use net::{
    retry::{RetryConsistent, RetryExponential, RetryPolicy},
    stream::{Frame, FrameSource, WsStream},
};
use pacing::StateId;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransportEvent {
    Connected,
    State(StateId),
    Disconnected,
    Error(String),
}

/// Opens the connection to the state arbiter.
pub trait Connector {
    fn connect(&mut self) -> Result<Box<dyn FrameSource + Send>, net::Error>;
}

pub struct WsConnector {
    url: String,
    retries: Option<usize>,
    interval: Duration,
    multiplier: Option<f64>,
    max_interval: Duration,
}

impl WsConnector {
    pub fn new(config: &EndpointConfig) -> Self {
        Self {
            url: config.url.clone(),
            retries: config.connect_retries,
            interval: config.retry_interval(),
            multiplier: config.retry_multiplier,
            max_interval: config.max_retry_interval(),
        }
    }

    fn retry_policy(&self) -> Box<dyn RetryPolicy> {
        match self.multiplier {
            Some(multiplier) => Box::new(
                RetryExponential::new(self.interval, multiplier, self.retries)
                    .with_max(self.max_interval),
            ),
            None => Box::new(RetryConsistent::new(self.interval, self.retries)),
        }
    }
}

impl Connector for WsConnector {
    fn connect(&mut self) -> Result<Box<dyn FrameSource + Send>, net::Error> {
        trace!("connecting to state arbiter at {}", self.url);
        let stream = WsStream::retryable_connect(&self.url, self.retry_policy())?;
        Ok(Box::new(stream))
    }
}

/// Reads frames on a background thread and turns them into
/// [`TransportEvent`]s, one at a time and in arrival order.
pub struct Transport {
    _read: JoinHandle<()>,
    events: Receiver<TransportEvent>,
}

impl Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

impl Transport {
    pub fn spawn<S>(source: S) -> std::io::Result<Self>
    where
        S: FrameSource + Send + 'static,
    {
        let (events_tx, events) = bounded(CHANNEL_CAPACITY);
        let read = thread::Builder::new()
            .name("transport".to_owned())
            .spawn(move || read_frames(source, events_tx))?;

        Ok(Self { _read: read, events })
    }

    pub fn events(&self) -> &Receiver<TransportEvent> {
        &self.events
    }
}

fn read_frames<S>(mut source: S, events: Sender<TransportEvent>)
where
    S: FrameSource,
{
    info!("connected to state arbiter");
    if events.send(TransportEvent::Connected).is_err() {
        return;
    }

    loop {
        let payload = match source.read_frame() {
            Ok(Frame::Text(text)) => text,
            Ok(Frame::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(err) => {
                    warn!("dropping binary payload that is not utf-8: {err}");
                    continue;
                }
            },
            Ok(Frame::Closed) => {
                info!("disconnected from state arbiter");
                let _ = events.send(TransportEvent::Disconnected);
                break;
            }
            Err(err) => {
                error!("transport error: {err}");
                let _ = events.send(TransportEvent::Error(err.to_string()));
                let _ = events.send(TransportEvent::Disconnected);
                break;
            }
        };

        let id = match StateId::new(payload) {
            Ok(id) => id,
            Err(err) => {
                warn!("dropping payload: {err}");
                continue;
            }
        };

        if events.send(TransportEvent::State(id)).is_err() {
            debug!("event receiver gone, stopping transport reader");
            break;
        }
    }
}
