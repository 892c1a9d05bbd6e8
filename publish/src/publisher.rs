use std::time::Duration;

use log::{debug, trace};
use ureq::{Agent, AgentBuilder};

use pacing::StateId;

use crate::error::Error;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Client of the hub's `POST /api/send` endpoint.
pub struct Publisher {
    url: String,
    agent: Agent,
}

impl Publisher {
    /// `addr` is the hub's publish address, e.g. `localhost:8081`.
    pub fn new(addr: &str) -> Self {
        let url = format!("http://{addr}/api/send");
        debug!("publishing states to {url}");
        Self {
            url,
            agent: AgentBuilder::new().timeout(TIMEOUT).build(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one state. Returns how many displays the hub reached.
    pub fn publish(&self, state: &StateId) -> Result<usize, Error> {
        trace!("publishing {state}");
        match self.agent.post(&self.url).send_string(state.as_str()) {
            Ok(response) => Ok(response
                .into_string()
                .ok()
                .and_then(|body| body.trim().parse().ok())
                .unwrap_or_default()),
            Err(ureq::Error::Status(status, _)) => Err(Error::Rejected(status)),
            Err(err) => Err(Box::new(err).into()),
        }
    }
}
