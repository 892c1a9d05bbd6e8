use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use pacing::StateId;

use crate::publisher::Publisher;

/// Target of the records a [`StateLogger`] sends to the hub.
pub const STATE_TARGET: &str = "arbiter_state";

/// A [`Log`] that sends every record logged on [`STATE_TARGET`] to the hub,
/// the message being the state. All records, states included, are also
/// handed to the inner logger if there is one.
pub struct StateLogger {
    publisher: Publisher,
    inner: Option<Box<dyn Log>>,
}

impl StateLogger {
    pub fn new(publisher: Publisher) -> Self {
        Self {
            publisher,
            inner: None,
        }
    }

    pub fn with_inner(mut self, inner: Box<dyn Log>) -> Self {
        self.inner = Some(inner);
        self
    }

    /// Installs the logger globally.
    pub fn init(self, level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level.max(LevelFilter::Info));
        Ok(())
    }

    fn send(&self, record: &Record) {
        let message = record.args().to_string();
        let result = StateId::new(message.trim())
            .map_err(|err| err.to_string())
            .and_then(|state| self.publisher.publish(&state).map_err(|err| err.to_string()));

        if let Err(err) = result {
            self.report(&format!("failed to publish state {message:?}: {err}"));
        }
    }

    // Failures go to the inner logger directly, logging through the facade
    // from here would re-enter this logger.
    fn report(&self, message: &str) {
        if let Some(inner) = &self.inner {
            inner.log(
                &Record::builder()
                    .level(Level::Warn)
                    .target(module_path!())
                    .args(format_args!("{message}"))
                    .build(),
            );
        }
    }
}

impl Log for StateLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target() == STATE_TARGET
            || self
                .inner
                .as_ref()
                .is_some_and(|inner| inner.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        if record.target() == STATE_TARGET {
            self.send(record);
        }

        if let Some(inner) = &self.inner {
            if inner.enabled(record.metadata()) {
                inner.log(record);
            }
        }
    }

    fn flush(&self) {
        if let Some(inner) = &self.inner {
            inner.flush();
        }
    }
}
