use log::{debug, info};

use crate::{error::Error, session::Session};

use super::{listening::release, Finished, State};

/// The transport is gone; queued states are still released once per tick.
pub struct Draining {
    pub(crate) session: Session,
    pub(crate) exit_when_drained: bool,
}

impl State for Draining {
    fn next(self: Box<Self>) -> Result<Box<dyn State>, Error> {
        let Draining {
            mut session,
            exit_when_drained,
        } = *self;

        if exit_when_drained && session.is_drained() {
            info!("every queued state was shown");
            return Ok(Box::new(Finished));
        }

        if session.ticks().recv().is_err() {
            debug!("release timer stopped");
            return Ok(Box::new(Finished));
        }
        release(&mut session);

        Ok(Box::new(Draining {
            session,
            exit_when_drained,
        }))
    }

    fn name(&self) -> &'static str {
        "draining"
    }
}
