use log::{debug, info};

use crate::{error::Error, session::Session, transport::Connector};

use super::{connecting::Connecting, State};

pub struct Init {
    pub(crate) session: Session,
    pub(crate) connector: Box<dyn Connector>,
    pub(crate) exit_when_drained: bool,
}

impl Init {
    pub fn init(
        session: Session,
        connector: Box<dyn Connector>,
        exit_when_drained: bool,
    ) -> Box<dyn State> {
        info!("starting state machine");
        Box::new(Init {
            session,
            connector,
            exit_when_drained,
        }) as _
    }
}

impl State for Init {
    fn next(self: Box<Self>) -> Result<Box<dyn State>, Error> {
        let Init {
            mut session,
            connector,
            exit_when_drained,
        } = *self;

        session.show_init()?;
        debug!("init panel up, moving to connecting");

        Ok(Box::new(Connecting {
            session,
            connector,
            exit_when_drained,
        }))
    }

    fn name(&self) -> &'static str {
        "init"
    }
}
