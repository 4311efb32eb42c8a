/// A voice scheduled to become idle once its release has elapsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingIdle {
    pub voice: usize,
    /// Trigger generation of the voice when the release began.
    pub generation: u64,
    /// Pool clock time (seconds) at which the transition is due.
    pub due: f64,
}

/// Cancelable deferred idle transitions, at most one per voice.
#[derive(Debug, Default)]
pub struct IdleScheduler {
    pending: Vec<PendingIdle>,
}

impl IdleScheduler {
    pub fn with_capacity(voices: usize) -> Self {
        Self {
            pending: Vec::with_capacity(voices),
        }
    }

    /// Schedule `voice` to go idle at `due`, replacing any earlier entry.
    pub fn schedule(&mut self, voice: usize, generation: u64, due: f64) {
        self.cancel(voice);
        self.pending.push(PendingIdle {
            voice,
            generation,
            due,
        });
    }

    /// Returns true when an entry was removed.
    pub fn cancel(&mut self, voice: usize) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.voice != voice);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Remove and return one entry due at or before `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<PendingIdle> {
        let position = self.pending.iter().position(|entry| entry.due <= now)?;
        Some(self.pending.swap_remove(position))
    }

    pub fn is_scheduled(&self, voice: usize) -> bool {
        self.pending.iter().any(|entry| entry.voice == voice)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_come_due_in_time() {
        let mut scheduler = IdleScheduler::default();
        scheduler.schedule(0, 1, 0.3);
        scheduler.schedule(1, 4, 0.1);

        assert_eq!(scheduler.pop_due(0.05), None);
        let first = scheduler.pop_due(0.1).map(|entry| entry.voice);
        assert_eq!(first, Some(1));
        assert_eq!(scheduler.pop_due(0.2), None);
        assert_eq!(scheduler.pop_due(1.0).map(|entry| entry.generation), Some(1));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn rescheduling_replaces_the_previous_entry() {
        let mut scheduler = IdleScheduler::default();
        scheduler.schedule(2, 1, 0.1);
        scheduler.schedule(2, 2, 0.5);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.pop_due(0.2), None);
    }

    #[test]
    fn cancellation() {
        let mut scheduler = IdleScheduler::with_capacity(4);
        scheduler.schedule(0, 1, 0.1);
        scheduler.schedule(1, 1, 0.1);
        assert!(scheduler.cancel(0));
        assert!(!scheduler.cancel(0));
        assert!(scheduler.is_scheduled(1));

        scheduler.cancel_all();
        assert_eq!(scheduler.pop_due(10.0), None);
    }
}
