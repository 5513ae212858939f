use std::collections::VecDeque;
use std::fmt;

/// Bounded FIFO of recent instantaneous speed samples for one identity.
///
/// Newest sample sits at the front; when the window is full the oldest
/// sample (back) is evicted. The displayed speed is the running mean.
#[derive(Clone)]
pub struct SpeedWindow {
    deque: VecDeque<f32>,
    capacity: usize,
}

impl fmt::Debug for SpeedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.deque.fmt(f)
    }
}

impl SpeedWindow {
    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            deque: VecDeque::with_capacity(cap),
            capacity: cap,
        }
    }

    /// Appends a sample, returning the evicted oldest one when full.
    #[inline]
    pub fn push(&mut self, sample: f32) -> Option<f32> {
        let evicted = if self.is_full() {
            self.deque.pop_back()
        } else {
            None
        };

        self.deque.push_front(sample);

        evicted
    }

    /// Arithmetic mean of the held samples, `None` while empty.
    pub fn mean(&self) -> Option<f32> {
        if self.deque.is_empty() {
            return None;
        }

        let sum: f32 = self.deque.iter().sum();
        Some(sum / self.deque.len() as f32)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.deque.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deque.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.deque.len() == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn clear(&mut self) {
        self.deque.clear()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &'_ f32> {
        self.deque.iter()
    }

    /// Oldest-first iteration.
    #[inline]
    pub fn asc_iter(&self) -> impl Iterator<Item = &'_ f32> {
        self.deque.iter().rev()
    }
}
