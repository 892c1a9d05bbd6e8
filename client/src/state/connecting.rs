use log::debug;

use crate::{
    error::Error,
    session::Session,
    transport::{Connector, Transport},
};

use super::{listening::Listening, State};

pub struct Connecting {
    pub(crate) session: Session,
    pub(crate) connector: Box<dyn Connector>,
    pub(crate) exit_when_drained: bool,
}

impl State for Connecting {
    fn next(self: Box<Self>) -> Result<Box<dyn State>, Error> {
        let Connecting {
            session,
            mut connector,
            exit_when_drained,
        } = *self;

        // No reconnect: the connector is used once and dropped here.
        let source = connector.connect()?;
        let transport = Transport::spawn(source)?;
        debug!("transport running, moving to listening");

        Ok(Box::new(Listening {
            session,
            transport,
            exit_when_drained,
        }))
    }

    fn name(&self) -> &'static str {
        "connecting"
    }
}
