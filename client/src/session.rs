use std::time::{Duration, Instant};

use crossbeam::channel::{tick, Receiver};
use log::{debug, info};

use pacing::{DisplayError, DisplaySurface, Enqueued, PacingQueue, Released, StateId};

/// One pacing session: the queue, the surface it drives and the release
/// ticker. Owned by the state machine and handed from state to state.
pub struct Session {
    queue: PacingQueue,
    surface: Box<dyn DisplaySurface>,
    ticks: Receiver<Instant>,
}

impl Session {
    pub fn new(surface: Box<dyn DisplaySurface>, period: Duration) -> Self {
        debug!("releasing at most one state every {period:?}");
        Self::with_ticks(surface, tick(period))
    }

    /// Uses `ticks` as the release timer instead of a wall-clock ticker.
    pub fn with_ticks(surface: Box<dyn DisplaySurface>, ticks: Receiver<Instant>) -> Self {
        Self {
            queue: PacingQueue::new(),
            surface,
            ticks,
        }
    }

    pub fn show_init(&mut self) -> Result<(), DisplayError> {
        self.surface.hide_all()?;
        self.surface.show_init()
    }

    pub fn on_state(&mut self, id: StateId) -> Result<Enqueued, DisplayError> {
        info!("new state: {id}");
        let enqueued = self.queue.enqueue(id, &mut self.surface)?;
        if let Enqueued::Queued { position } = enqueued {
            debug!("state delayed behind {position} others");
        }
        Ok(enqueued)
    }

    pub fn on_tick(&mut self) -> Result<Released, DisplayError> {
        self.queue.release(&mut self.surface)
    }

    pub fn ticks(&self) -> &Receiver<Instant> {
        &self.ticks
    }

    pub fn queue(&self) -> &PacingQueue {
        &self.queue
    }

    pub fn is_drained(&self) -> bool {
        self.queue.is_empty()
    }
}
