use std::time::Duration;

/// Decides whether a failed connection attempt is tried again.
///
/// Only used for the first connection; a session that was established and
/// then lost is never re-established.
pub trait RetryPolicy {
    /// Waits before the next attempt; `false` means give up.
    fn retry(&mut self) -> bool;
}

impl<P> RetryPolicy for Box<P>
where
    P: RetryPolicy + ?Sized,
{
    fn retry(&mut self) -> bool {
        (**self).retry()
    }
}

pub struct RetryConsistent {
    count: Option<usize>,
    duration: Duration,
}

impl RetryConsistent {
    pub fn new(duration: Duration, count: Option<usize>) -> Self {
        Self { count, duration }
    }
}

impl RetryPolicy for RetryConsistent {
    fn retry(&mut self) -> bool {
        if !take_attempt(&mut self.count) {
            return false;
        }

        std::thread::sleep(self.duration);
        true
    }
}

pub struct RetryExponential {
    count: Option<usize>,
    duration: Duration,
    multiplier: f64,
    max: Duration,
}

impl RetryExponential {
    pub fn new(duration: Duration, multiplier: f64, count: Option<usize>) -> Self {
        Self {
            count,
            duration,
            multiplier,
            max: Duration::MAX,
        }
    }

    /// Caps the wait between two attempts.
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }
}

impl RetryPolicy for RetryExponential {
    fn retry(&mut self) -> bool {
        if !take_attempt(&mut self.count) {
            return false;
        }

        std::thread::sleep(self.duration);
        let next = self.duration.as_secs_f64() * self.multiplier;
        self.duration = Duration::try_from_secs_f64(next)
            .unwrap_or(self.max)
            .min(self.max);

        true
    }
}

fn take_attempt(count: &mut Option<usize>) -> bool {
    match count.as_mut() {
        Some(0) => false,
        Some(count) => {
            *count -= 1;
            true
        }
        None => true,
    }
}
