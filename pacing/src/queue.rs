use std::collections::VecDeque;

use log::{debug, trace};

use crate::{error::DisplayError, state_id::StateId, surface::DisplaySurface};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Entry {
    State(StateId),
    /// Keeps the current state on display; never shown itself.
    Marker(Marker),
}

/// Where a marker was pushed relative to the release ticks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Marker {
    /// Pushed between two ticks, so the next tick closes less than a full
    /// period. The first release re-arms it as [`Marker::Aligned`].
    Unaligned,
    /// Pushed on a tick, so the next tick closes a full period. Releasing it
    /// falls through to the entry behind it.
    Aligned,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Enqueued {
    /// The queue was idle and the state went straight to the surface.
    Shown,
    /// The state waits behind others; `position` is the number of queued
    /// states ahead of it.
    Queued { position: usize },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Released {
    /// Nothing was queued.
    Idle,
    /// A marker was consumed and the current state stays on display.
    Held,
    Shown(StateId),
}

/// FIFO of pending states, released one per tick.
///
/// Every state that reaches the surface, either straight from
/// [`PacingQueue::enqueue`] or from [`PacingQueue::release`], stays visible
/// for at least one full release period. States are never dropped,
/// reordered or coalesced; a burst is only delayed.
#[derive(Debug, Default)]
pub struct PacingQueue {
    entries: VecDeque<Entry>,
    current: Option<StateId>,
}

impl PacingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a newly arrived state.
    ///
    /// If the surface fails on the immediate path the queue is left as it
    /// was and the error is returned.
    pub fn enqueue<S>(&mut self, id: StateId, surface: &mut S) -> Result<Enqueued, DisplayError>
    where
        S: DisplaySurface + ?Sized,
    {
        if !self.entries.is_empty() {
            self.entries.push_back(Entry::State(id));
            let position = self.pending().count() - 1;
            trace!("queued state with {position} ahead of it");
            return Ok(Enqueued::Queued { position });
        }

        surface.show(&id)?;
        debug!("showing {id} immediately");
        self.entries.push_back(Entry::Marker(Marker::Unaligned));
        self.current = Some(id);

        Ok(Enqueued::Shown)
    }

    /// Advances the queue by one tick.
    ///
    /// Popped entries are consumed even if the surface then fails: the state
    /// is dropped, `current` keeps its value and no trailing marker is
    /// pushed.
    pub fn release<S>(&mut self, surface: &mut S) -> Result<Released, DisplayError>
    where
        S: DisplaySurface + ?Sized,
    {
        let id = match self.entries.pop_front() {
            None => return Ok(Released::Idle),
            Some(Entry::State(id)) => id,
            Some(Entry::Marker(Marker::Unaligned)) => {
                trace!("re-arming marker for {:?}", self.current);
                self.entries.push_front(Entry::Marker(Marker::Aligned));
                return Ok(Released::Held);
            }
            Some(Entry::Marker(Marker::Aligned)) => match self.entries.pop_front() {
                Some(Entry::State(id)) => id,
                Some(marker @ Entry::Marker(_)) => {
                    self.entries.push_front(marker);
                    return Ok(Released::Held);
                }
                None => {
                    trace!("dwell period for {:?} elapsed", self.current);
                    return Ok(Released::Held);
                }
            },
        };

        surface.show(&id)?;
        debug!("released {id}");
        if self.entries.is_empty() {
            self.entries.push_back(Entry::Marker(Marker::Aligned));
        }
        self.current = Some(id.clone());

        Ok(Released::Shown(id))
    }

    /// The state on display, `None` while the init panel is up.
    pub fn current(&self) -> Option<&StateId> {
        self.current.as_ref()
    }

    /// Queued states in release order, markers skipped.
    pub fn pending(&self) -> impl Iterator<Item = &StateId> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::State(id) => Some(id),
            Entry::Marker(_) => None,
        })
    }

    /// Number of entries, markers included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
