//! Pushing states to the hub, either directly through a [`Publisher`] or
//! through the application's logger with [`StateLogger`] and [`state!`].

#[doc(hidden)]
pub use log;

mod error;
pub use error::Error;

mod publisher;
pub use publisher::Publisher;

mod state_logger;
pub use state_logger::{StateLogger, STATE_TARGET};

/// Logs a state change on [`STATE_TARGET`]. An installed [`StateLogger`]
/// sends it to the hub.
#[macro_export]
macro_rules! state {
    ($state:expr) => {
        $crate::log::info!(target: $crate::STATE_TARGET, "{}", $state)
    };
}
