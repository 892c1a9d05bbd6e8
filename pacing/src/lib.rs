//! Pacing of display transitions.
//!
//! States arrive whenever the transport delivers them; the [`PacingQueue`]
//! turns them into display transitions that happen at most once per release
//! period, so that every state stays on the [`DisplaySurface`] for at least
//! one full period before it is replaced.

mod error;
pub use error::{DisplayError, Error};

mod queue;
pub use queue::{Enqueued, PacingQueue, Released};

mod state_id;
pub use state_id::StateId;

mod surface;
pub use surface::DisplaySurface;
