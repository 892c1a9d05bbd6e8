use crossbeam::channel::select;
use log::{debug, error, trace, warn};

use pacing::Released;

use crate::{
    error::Error,
    session::Session,
    transport::{Transport, TransportEvent},
};

use super::{draining::Draining, State};

pub struct Listening {
    pub(crate) session: Session,
    pub(crate) transport: Transport,
    pub(crate) exit_when_drained: bool,
}

impl State for Listening {
    fn next(self: Box<Self>) -> Result<Box<dyn State>, Error> {
        let Listening {
            mut session,
            transport,
            exit_when_drained,
        } = *self;

        let ticks = session.ticks().clone();
        let events = transport.events().clone();

        select! {
            recv(ticks) -> _ => release(&mut session),
            recv(events) -> event => match event {
                Ok(TransportEvent::State(id)) => {
                    if let Err(err) = session.on_state(id) {
                        error!("failed to show state: {err}");
                    }
                }
                Ok(TransportEvent::Connected) => trace!("transport connected"),
                Ok(TransportEvent::Error(err)) => warn!("transport failed: {err}"),
                Ok(TransportEvent::Disconnected) | Err(_) => {
                    debug!(
                        "transport closed with {} states queued, moving to draining",
                        session.queue().pending().count()
                    );
                    return Ok(Box::new(Draining {
                        session,
                        exit_when_drained,
                    }));
                }
            },
        }

        Ok(Box::new(Listening {
            session,
            transport,
            exit_when_drained,
        }))
    }

    fn name(&self) -> &'static str {
        "listening"
    }
}

/// Runs one release tick, logging rather than propagating display errors so
/// that later ticks still run.
pub(crate) fn release(session: &mut Session) {
    match session.on_tick() {
        Ok(Released::Shown(id)) => debug!("showing {id}"),
        Ok(Released::Held | Released::Idle) => {}
        Err(err) => error!("failed to show released state: {err}"),
    }
}
