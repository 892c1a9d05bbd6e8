use std::{collections::BTreeMap, sync::Arc};

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, trace, warn};
use parking_lot::Mutex;
use uuid::Uuid;

use pacing::StateId;

/// Fans each published state out to every subscriber.
///
/// Every subscriber owns a bounded channel. A subscriber that falls behind
/// by more than `capacity` states misses the newer ones; one whose receiver
/// is gone is dropped on the next publish.
#[derive(Clone)]
pub(crate) struct Broadcaster {
    capacity: usize,
    subscribers: Arc<Mutex<BTreeMap<Uuid, Sender<String>>>>,
}

impl Broadcaster {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            subscribers: Arc::default(),
        }
    }

    pub(crate) fn subscribe(&self) -> (Uuid, Receiver<String>) {
        let (tx, rx) = bounded(self.capacity);
        let id = Uuid::new_v4();
        self.subscribers.lock().insert(id, tx);
        debug!("subscriber {id} added");
        (id, rx)
    }

    pub(crate) fn unsubscribe(&self, id: Uuid) -> bool {
        let removed = self.subscribers.lock().remove(&id).is_some();
        if removed {
            debug!("subscriber {id} removed");
        }
        removed
    }

    /// Returns how many subscribers the state was queued for.
    pub(crate) fn publish(&self, state: &StateId) -> usize {
        let mut subscribers = self.subscribers.lock();
        let mut reached = 0;
        subscribers.retain(|id, tx| match tx.try_send(state.to_string()) {
            Ok(()) => {
                reached += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!("subscriber {id} is behind, dropping {state} for it");
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("subscriber {id} gone");
                false
            }
        });

        trace!("published {state} to {reached} subscribers");
        reached
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.lock().len()
    }
}
