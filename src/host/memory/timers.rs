use std::collections::BTreeMap;

use crate::host::Callback;

#[derive(Debug, Clone)]
struct Timer {
    due_ms: u64,
    interval_ms: Option<u64>,
    callback: Callback,
}

/// Timers and animation frames on a manually advanced clock.
///
/// Nothing fires on its own; the owner pulls due work out with
/// [`TimerQueue::next_due`] and [`TimerQueue::take_frames`] and invokes the
/// callbacks after releasing any borrow of the queue.
#[derive(Debug, Default)]
pub(super) struct TimerQueue {
    now_ms: u64,
    next_timer_id: u32,
    timers: BTreeMap<u32, Timer>,
    next_frame_id: u32,
    frames: BTreeMap<u32, Callback>,
}

impl TimerQueue {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn set_timeout(&mut self, callback: Callback, delay_ms: u64) -> u32 {
        self.schedule(callback, delay_ms, None)
    }

    pub fn set_interval(&mut self, callback: Callback, delay_ms: u64) -> u32 {
        // A zero interval would spin forever inside one `advance`.
        let period = delay_ms.max(1);
        self.schedule(callback, period, Some(period))
    }

    fn schedule(&mut self, callback: Callback, delay_ms: u64, interval_ms: Option<u64>) -> u32 {
        self.next_timer_id += 1;
        let timer_id = self.next_timer_id;
        self.timers.insert(
            timer_id,
            Timer {
                due_ms: self.now_ms + delay_ms,
                interval_ms,
                callback,
            },
        );
        timer_id
    }

    pub fn clear_timer(&mut self, timer_id: u32) -> bool {
        self.timers.remove(&timer_id).is_some()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Pop the earliest timer due at or before `deadline_ms`, moving the
    /// clock to its due time. Intervals are re-armed before they fire.
    pub fn next_due(&mut self, deadline_ms: u64) -> Option<(u32, Callback)> {
        let (timer_id, due_ms) = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due_ms <= deadline_ms)
            .min_by_key(|(id, timer)| (timer.due_ms, **id))
            .map(|(id, timer)| (*id, timer.due_ms))?;

        self.now_ms = self.now_ms.max(due_ms);
        let timer = self.timers.get_mut(&timer_id)?;
        let callback = timer.callback.clone();
        match timer.interval_ms {
            Some(period) => timer.due_ms += period,
            None => {
                self.timers.remove(&timer_id);
            }
        }
        Some((timer_id, callback))
    }

    pub fn finish_advance(&mut self, deadline_ms: u64) {
        self.now_ms = self.now_ms.max(deadline_ms);
    }

    pub fn request_frame(&mut self, callback: Callback) -> u32 {
        self.next_frame_id += 1;
        self.frames.insert(self.next_frame_id, callback);
        self.next_frame_id
    }

    pub fn cancel_frame(&mut self, frame_id: u32) -> bool {
        self.frames.remove(&frame_id).is_some()
    }

    /// Frames requested while these run belong to the next frame.
    pub fn take_frames(&mut self) -> Vec<Callback> {
        std::mem::take(&mut self.frames).into_values().collect()
    }

    pub fn clear_all(&mut self) {
        self.timers.clear();
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Value;

    fn noop() -> Callback {
        Callback::new(|_| Ok(Value::Undefined))
    }

    #[test]
    fn timeouts_fire_in_due_order() {
        let mut queue = TimerQueue::default();
        let late = queue.set_timeout(noop(), 50);
        let early = queue.set_timeout(noop(), 10);

        assert_eq!(queue.next_due(100).map(|(id, _)| id), Some(early));
        assert_eq!(queue.now_ms(), 10);
        assert_eq!(queue.next_due(100).map(|(id, _)| id), Some(late));
        assert!(queue.next_due(100).is_none());
        queue.finish_advance(100);
        assert_eq!(queue.now_ms(), 100);
    }

    #[test]
    fn intervals_rearm_until_cleared() {
        let mut queue = TimerQueue::default();
        let id = queue.set_interval(noop(), 10);
        let mut fired = 0;
        while queue.next_due(35).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert!(queue.clear_timer(id));
        assert_eq!(queue.pending_timers(), 0);
    }

    #[test]
    fn frames_are_taken_once() {
        let mut queue = TimerQueue::default();
        let first = queue.request_frame(noop());
        queue.request_frame(noop());
        assert!(queue.cancel_frame(first));
        assert_eq!(queue.take_frames().len(), 1);
        assert!(queue.take_frames().is_empty());
    }
}
